pub mod decode;
pub mod encode;
pub mod functions;
pub mod helpers;
pub mod sequence;
pub mod size;
pub mod types;
pub mod view;

/* Re-export main public functions */
pub use functions::{emit_constructor, emit_error, emit_event, emit_function, Context};
pub use sequence::{emit_sequence, Sequence};
pub use types::{emit_struct, StructOptions};
pub use view::{emit_sequence_view, emit_struct_view};
