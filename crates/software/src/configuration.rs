//! This module contains the settings which determine how button input is turned into MIDI. All of them are fixed
//! once the controller is constructed.

mod controller;
pub use controller::*;

mod retrigger_policy;
pub use retrigger_policy::*;
