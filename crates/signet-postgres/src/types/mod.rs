//! Contains constraints, enumerations and other custom types.

mod constraint;
mod flow_type;
mod pagination;

pub use constraint::{
    ConstraintCategory, ConstraintViolation, FlowConstraints, FlowVersionConstraints,
};
pub use flow_type::FlowType;
pub use pagination::{MAX_LIMIT, OffsetPage, OffsetPagination};
