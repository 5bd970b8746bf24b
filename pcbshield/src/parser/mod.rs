pub mod pcb;
pub mod sexp;

pub use pcb::{segment_to_sexp, PcbParseError, PcbParser};
pub use sexp::{ParseError, SExp, SExpParser};
