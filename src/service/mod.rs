//! EntityAccessor: generic CRUD using the safe SQL builder.

mod accessor;
pub use accessor::EntityAccessor;
