//! Mock sources standing in for the matching service and the map widget.

use bevy_ecs::prelude::Resource;
use h3o::{CellIndex, Resolution};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{PickerConfig, RequestTemplate};
use crate::ecs::{LocationKind, RideId, RideRequest};
use crate::error::RideError;
use crate::spatial::Location;

const RIDE_ID_PREFIX: &str = "ride-";
const RIDE_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Resolution the picker snaps pins to (~1.2 km cells).
const PICKER_RESOLUTION: Resolution = Resolution::Seven;
/// Largest grid distance the picker samples from (about 30 km at resolution 7).
pub const MAX_PICKER_SPREAD: u32 = 20;

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Produces the next ride request offered to an idle driver.
#[derive(Resource)]
pub struct RequestFeed {
    rng: StdRng,
    templates: Vec<RequestTemplate>,
    cursor: usize,
}

impl RequestFeed {
    pub fn new(seed: Option<u64>, templates: Vec<RequestTemplate>) -> Self {
        let templates = if templates.is_empty() {
            vec![RequestTemplate::default()]
        } else {
            templates
        };
        Self {
            rng: rng_from(seed),
            templates,
            cursor: 0,
        }
    }

    pub fn next_request(&mut self) -> RideRequest {
        let template = &self.templates[self.cursor % self.templates.len()];
        self.cursor = self.cursor.wrapping_add(1);
        let suffix: String = (0..RIDE_ID_LEN)
            .map(|_| char::from(BASE36[self.rng.gen_range(0..BASE36.len())]))
            .collect();
        template.to_request(RideId(format!("{RIDE_ID_PREFIX}{suffix}")))
    }
}

/// Drops pins on random H3 cell centers near a configured point.
#[derive(Resource)]
pub struct LocationPicker {
    rng: StdRng,
    candidates: Vec<CellIndex>,
    pickup_address: String,
    dropoff_address: String,
}

impl LocationPicker {
    pub fn new(seed: Option<u64>, config: &PickerConfig) -> Result<Self, RideError> {
        if config.spread_cells > MAX_PICKER_SPREAD {
            return Err(RideError::InvalidConfig {
                field: "picker.spread_cells",
                reason: format!(
                    "{} exceeds the maximum of {MAX_PICKER_SPREAD}",
                    config.spread_cells
                ),
            });
        }
        let center = Location::new(config.center_lat, config.center_lng)?;
        let origin = center.cell(PICKER_RESOLUTION)?;
        Ok(Self {
            rng: rng_from(seed),
            candidates: origin.grid_disk::<Vec<_>>(config.spread_cells),
            pickup_address: config.pickup_address.clone(),
            dropoff_address: config.dropoff_address.clone(),
        })
    }

    pub fn pick(&mut self, kind: LocationKind) -> Option<Location> {
        let cell = *self.candidates.choose(&mut self.rng)?;
        let address = match kind {
            LocationKind::Pickup => &self.pickup_address,
            LocationKind::Dropoff => &self.dropoff_address,
        };
        Some(Location::from_cell(cell).with_address(address.clone()))
    }
}
