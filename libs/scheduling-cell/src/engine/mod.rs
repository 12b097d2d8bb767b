// libs/scheduling-cell/src/engine/mod.rs
//
// The availability engine: pure functions over snapshots of schedule
// configuration and existing bookings. No I/O, no clock access, no state
// between calls; the service layer loads the inputs and the presentation
// layer renders the outputs.

pub mod hours;
pub mod exclusions;
pub mod slots;
pub mod rooms;

pub use hours::effective_window;
pub use exclusions::{is_date_excluded, is_time_in_break};
pub use slots::generate_slots;
pub use rooms::available_rooms;
