/* ABI Reflection Library
 *
 * A reference interpreter for the head/tail codec: encodes and decodes
 * dynamically-typed Values against a TypeDescriptor, with the same strict
 * validation generated codecs perform. Also provides lazy tuple views,
 * event log encoding/decoding and selector-based call reflection over a
 * parsed Abi.
 */

pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod event;
pub mod lazy;
pub mod reflect;
pub mod value;

pub use decoder::{decode, decode_tuple, measure};
pub use encoder::{encode, encode_into, encode_packed, encode_tuple, encoded_size};
pub use errors::{ReflectError, ReflectResult};
pub use event::{decode_log, encode_log, Log};
pub use lazy::{LazyArray, LazyTuple, LazyValue};
pub use reflect::{DecodedCall, DecodedLog, Reflector};
pub use value::Value;
