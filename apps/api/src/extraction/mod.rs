// Pure text extraction routines: no network, no filesystem, no shared state.
// Callers decide how an empty result maps onto the error taxonomy.

pub mod html;
pub mod pdf;
