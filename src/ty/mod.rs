mod key_tuple;
pub use key_tuple::KeyTuple;

mod table;
pub use table::TableShow;
