// Python-bindinger (feature `python`). Kun JSON inn/ut; all logikk ligger i kjernen.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::error::EngineError;

fn to_py_err(e: EngineError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// RecordedSession (JSON) → WorkoutSummary (JSON) eller "null".
#[pyfunction]
#[pyo3(name = "analyze_session_json")]
fn py_analyze_session_json(input: &str) -> PyResult<String> {
    crate::analyze_session::analyze_session_json(input).map_err(to_py_err)
}

/// {"workout": "...", "samples": [...]} → FftResult (JSON) eller "null".
#[pyfunction]
#[pyo3(name = "estimate_cadence_json")]
fn py_estimate_cadence_json(input: &str) -> PyResult<String> {
    crate::analyze_session::estimate_cadence_json(input).map_err(to_py_err)
}

#[pymodule]
fn cadence_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_analyze_session_json, m)?)?;
    m.add_function(wrap_pyfunction!(py_estimate_cadence_json, m)?)?;
    Ok(())
}
