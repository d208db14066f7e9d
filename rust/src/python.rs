//! Python bindings (feature `python`).
//!
//! Requests and responses cross the boundary as JSON strings in the same
//! shape as the Rust serde types.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::SchedulingConfig;
use crate::engine::schedule;
use crate::models::ScheduleRequest;
use crate::reschedule::{
    ProjectGraph, RescheduleError, RescheduleOutcome, RescheduleTracker, ScheduleStore, StoreError,
};

fn parse_config(config_json: Option<&str>) -> PyResult<SchedulingConfig> {
    match config_json {
        Some(json) => {
            SchedulingConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))
        }
        None => Ok(SchedulingConfig::default()),
    }
}

/// Schedule a project graph.
///
/// # Arguments
/// * `request_json` - ScheduleRequest as JSON
/// * `config_json` - Optional SchedulingConfig as JSON
///
/// # Returns
/// * ScheduleResponse as JSON
///
/// # Raises
/// * ValueError on malformed input, cycles, or a bad cascade anchor
#[pyfunction]
#[pyo3(signature = (request_json, config_json=None))]
fn run_schedule(request_json: &str, config_json: Option<&str>) -> PyResult<String> {
    let request =
        ScheduleRequest::from_json(request_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let config = parse_config(config_json)?;
    let response = schedule(&request, &config).map_err(|e| PyValueError::new_err(e.to_string()))?;
    response
        .to_json()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Adapts a Python object with `load_graph() -> str` and
/// `write_scheduled_dates(id, start, end)` methods to `ScheduleStore`.
///
/// Holds an owned reference and takes the GIL per call, so the tracker can run
/// with the GIL released.
struct PyStore {
    obj: Py<PyAny>,
}

impl ScheduleStore for PyStore {
    fn load_graph(&self) -> Result<ProjectGraph, StoreError> {
        Python::with_gil(|py| -> Result<ProjectGraph, StoreError> {
            let json: String = self.obj.bind(py).call_method0("load_graph")?.extract()?;
            Ok(serde_json::from_str(&json)?)
        })
    }

    fn write_scheduled_dates(
        &self,
        work_item_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), StoreError> {
        Python::with_gil(|py| -> Result<(), StoreError> {
            self.obj
                .bind(py)
                .call_method1("write_scheduled_dates", (work_item_id, start, end))?;
            Ok(())
        })
    }
}

fn outcome_to_py(result: Result<RescheduleOutcome, RescheduleError>) -> PyResult<bool> {
    match result {
        Ok(RescheduleOutcome::AlreadyRan) => Ok(false),
        Ok(RescheduleOutcome::Rescheduled { .. }) => Ok(true),
        Err(e @ RescheduleError::Schedule(_)) => Err(PyValueError::new_err(e.to_string())),
        Err(e) => Err(PyRuntimeError::new_err(e.to_string())),
    }
}

/// Daily reschedule gate (PyO3 wrapper).
#[pyclass(name = "RescheduleTracker")]
pub struct PyRescheduleTracker {
    inner: RescheduleTracker,
}

#[pymethods]
impl PyRescheduleTracker {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        Ok(Self {
            inner: RescheduleTracker::new(parse_config(config_json)?),
        })
    }

    /// Returns True if a pass ran, False if one already ran today.
    ///
    /// The GIL is released while waiting for and holding the tracker lock;
    /// store callbacks reacquire it.
    fn ensure_daily_reschedule(
        &self,
        py: Python<'_>,
        store: Py<PyAny>,
        today: NaiveDate,
    ) -> PyResult<bool> {
        let store = PyStore { obj: store };
        let result = py.allow_threads(|| self.inner.ensure_daily_reschedule(&store, today));
        outcome_to_py(result)
    }

    fn reset(&self) {
        self.inner.reset();
    }

    fn last_run_date(&self) -> Option<NaiveDate> {
        self.inner.last_run_date()
    }

    fn __repr__(&self) -> String {
        format!("RescheduleTracker(last_run_date={:?})", self.inner.last_run_date())
    }
}

/// The workplan_engine Python module.
#[pymodule]
fn workplan_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRescheduleTracker>()?;
    m.add_function(wrap_pyfunction!(run_schedule, m)?)?;
    Ok(())
}
