use std::fmt::Display;

#[derive(Debug)]
pub enum VesselError {
    Input(String),
    UnknownParameter(String),
    ConstraintViolation(String),
    Recompute(String),
    Meshing(String),
    Prerequisite(String),
    Solver(String),
    ResultType(String),
    EmptyResultSet(String),
    Output(String),
}

impl Display for VesselError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            VesselError::Input(v) => ("Input", v),
            VesselError::UnknownParameter(v) => ("Unknown Parameter", v),
            VesselError::ConstraintViolation(v) => ("Constraint Violation", v),
            VesselError::Recompute(v) => ("Recompute", v),
            VesselError::Meshing(v) => ("Meshing", v),
            VesselError::Prerequisite(v) => ("Prerequisite", v),
            VesselError::Solver(v) => ("Solver", v),
            VesselError::ResultType(v) => ("Result Type", v),
            VesselError::EmptyResultSet(v) => ("Empty Result Set", v),
            VesselError::Output(v) => ("Output", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
