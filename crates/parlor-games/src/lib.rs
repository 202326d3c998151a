//! Game engines for Parlor.
//!
//! Each engine implements [`parlor_room::Game`]: an initial state, a
//! command enum decoded from client frames, and the rules that validate
//! and apply those commands to a draft state.
//!
//! - [`Chess`]: two seats, full move legality and check detection
//! - [`Escampe`]: two seats, placement phase, terrain-constrained moves
//! - [`Solitaire`]: one player, any number of spectators
//! - [`PetitBac`]: word rounds for any number of named players

pub mod chess;
pub mod escampe;
pub mod petitbac;
pub mod solitaire;

mod seats;

pub use chess::Chess;
pub use escampe::Escampe;
pub use petitbac::PetitBac;
pub use solitaire::Solitaire;
pub use seats::Seats;
