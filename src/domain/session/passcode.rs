//! Passcode issuance

use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::Passcode;
use rand::Rng;

const PASSCODE_MIN: u32 = 100_000;
const PASSCODE_MAX: u32 = 999_999;

/// Draw a passcode uniformly from 100000..=999999.
///
/// Passcodes are scoped by event id; collisions across events are allowed.
pub fn generate_passcode<R: Rng + ?Sized>(rng: &mut R) -> Result<Passcode> {
    Passcode::from_number(rng.gen_range(PASSCODE_MIN..=PASSCODE_MAX))
}
