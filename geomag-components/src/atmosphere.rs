//! GOST 4401-81 standard atmosphere.
//!
//! Partial implementation of the standard atmosphere, useful for processing
//! data from barometric sensors: temperature and pressure over the altitude
//! span from 0 up to 51 km.
//!
//! The model is a table of six empirical layers, each with a base
//! geopotential altitude, base temperature, temperature gradient and base
//! pressure. Within a layer the barometric formula applies, branching on
//! whether the layer is isothermal. Lookups outside the supported span
//! return `None`.

use geomag_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Standard acceleration of free fall (m/s²).
pub const STANDARD_GRAVITY: FloatValue = 9.80665;

/// Specific gas constant of dry air (J/(kg·K)).
pub const AIR_GAS_CONSTANT: FloatValue = 287.052_87;

/// Conventional Earth radius of the geopotential conversion (m).
pub const CONVENTIONAL_RADIUS_M: FloatValue = 6_356_766.0;

/// Pressure at the top of the supported span (Pa).
pub const MIN_PRESSURE_PA: FloatValue = 6.693_84;

/// Sea-level pressure (Pa).
pub const MAX_PRESSURE_PA: FloatValue = 101_325.0;

const MIN_GEOPOTENTIAL_M: FloatValue = 0.0;
const MAX_GEOPOTENTIAL_M: FloatValue = 51_000.0;

/// One layer of the averaged empirical table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereLayer {
    /// Geopotential altitude at the layer base (m).
    pub base_altitude_m: FloatValue,
    /// Temperature at the layer base (K).
    pub base_temperature_k: FloatValue,
    /// Temperature gradient through the layer (K/m); zero for isothermal
    /// layers.
    pub lapse_rate_k_per_m: FloatValue,
    /// Pressure at the layer base (Pa).
    pub base_pressure_pa: FloatValue,
}

/// Averaged empirical parameters for the lower layers of the atmosphere.
/// The last record only bounds the layer below it.
pub static LAYERS: [AtmosphereLayer; 6] = [
    AtmosphereLayer {
        base_altitude_m: 0.0,
        base_temperature_k: 288.15,
        lapse_rate_k_per_m: -0.0065,
        base_pressure_pa: 101_325.0,
    },
    AtmosphereLayer {
        base_altitude_m: 11_000.0,
        base_temperature_k: 216.65,
        lapse_rate_k_per_m: 0.0,
        base_pressure_pa: 22_632.04,
    },
    AtmosphereLayer {
        base_altitude_m: 20_000.0,
        base_temperature_k: 216.65,
        lapse_rate_k_per_m: 0.0010,
        base_pressure_pa: 5_474.87,
    },
    AtmosphereLayer {
        base_altitude_m: 32_000.0,
        base_temperature_k: 228.65,
        lapse_rate_k_per_m: 0.0028,
        base_pressure_pa: 868.014_6,
    },
    AtmosphereLayer {
        base_altitude_m: 47_000.0,
        base_temperature_k: 270.65,
        lapse_rate_k_per_m: 0.0,
        base_pressure_pa: 110.905_6,
    },
    AtmosphereLayer {
        base_altitude_m: 51_000.0,
        base_temperature_k: 270.65,
        lapse_rate_k_per_m: -0.0028,
        base_pressure_pa: 6.693_84,
    },
];

/// Convert geopotential altitude (m) to geometric altitude (m).
pub fn geopotential_to_geometric(altitude_m: FloatValue) -> FloatValue {
    altitude_m * CONVENTIONAL_RADIUS_M / (CONVENTIONAL_RADIUS_M - altitude_m)
}

/// Convert geometric altitude (m) to geopotential altitude (m).
pub fn geometric_to_geopotential(altitude_m: FloatValue) -> FloatValue {
    altitude_m * CONVENTIONAL_RADIUS_M / (CONVENTIONAL_RADIUS_M + altitude_m)
}

/// Layer containing a geopotential altitude known to be inside the span.
fn layer_for_geopotential(geopotential_m: FloatValue) -> &'static AtmosphereLayer {
    LAYERS
        .windows(2)
        .find(|pair| geopotential_m >= pair[0].base_altitude_m && geopotential_m < pair[1].base_altitude_m)
        .map(|pair| &pair[0])
        .unwrap_or(&LAYERS[LAYERS.len() - 2])
}

/// Layer containing a pressure known to be inside the span.
fn layer_for_pressure(pressure_pa: FloatValue) -> &'static AtmosphereLayer {
    LAYERS
        .windows(2)
        .find(|pair| pressure_pa <= pair[0].base_pressure_pa && pressure_pa > pair[1].base_pressure_pa)
        .map(|pair| &pair[0])
        .unwrap_or(&LAYERS[LAYERS.len() - 2])
}

/// Pressure in pascals at a geometric altitude, or `None` outside the
/// supported 0–51 km geopotential span.
pub fn pressure_at(altitude_m: FloatValue) -> Option<FloatValue> {
    let geopotential = geometric_to_geopotential(altitude_m);
    if !(MIN_GEOPOTENTIAL_M..MAX_GEOPOTENTIAL_M).contains(&geopotential) {
        return None;
    }
    let layer = layer_for_geopotential(geopotential);
    let above_base = geopotential - layer.base_altitude_m;
    let pressure = if layer.lapse_rate_k_per_m != 0.0 {
        let temperature_ratio =
            (layer.base_temperature_k + layer.lapse_rate_k_per_m * above_base) / layer.base_temperature_k;
        layer.base_pressure_pa
            * temperature_ratio.powf(-STANDARD_GRAVITY / (layer.lapse_rate_k_per_m * AIR_GAS_CONSTANT))
    } else {
        layer.base_pressure_pa
            * (-STANDARD_GRAVITY * above_base / (AIR_GAS_CONSTANT * layer.base_temperature_k)).exp()
    };
    Some(pressure)
}

/// Temperature in kelvin at a geometric altitude, or `None` outside the
/// supported span.
pub fn temperature_at(altitude_m: FloatValue) -> Option<FloatValue> {
    let geopotential = geometric_to_geopotential(altitude_m);
    if !(MIN_GEOPOTENTIAL_M..MAX_GEOPOTENTIAL_M).contains(&geopotential) {
        return None;
    }
    let layer = layer_for_geopotential(geopotential);
    Some(layer.base_temperature_k + layer.lapse_rate_k_per_m * (geopotential - layer.base_altitude_m))
}

/// Geometric altitude in metres for a pressure, or `None` outside the
/// supported (6.69384, 101325] Pa span.
pub fn altitude_for_pressure(pressure_pa: FloatValue) -> Option<FloatValue> {
    if pressure_pa <= MIN_PRESSURE_PA || pressure_pa > MAX_PRESSURE_PA {
        return None;
    }
    let layer = layer_for_pressure(pressure_pa);
    let above_base = if layer.lapse_rate_k_per_m != 0.0 {
        layer.base_temperature_k
            * ((layer.base_pressure_pa / pressure_pa)
                .powf(layer.lapse_rate_k_per_m * AIR_GAS_CONSTANT / STANDARD_GRAVITY)
                - 1.0)
            / layer.lapse_rate_k_per_m
    } else {
        AIR_GAS_CONSTANT * layer.base_temperature_k / STANDARD_GRAVITY
            * (layer.base_pressure_pa / pressure_pa).ln()
    };
    Some(geopotential_to_geometric(layer.base_altitude_m + above_base))
}
