/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Unit conversions applied when presenting inventory values
//!
//! The model keeps raw integers; renderers call these on the way out.

const HZ_PER_GHZ: f64 = 1_000_000_000.0;
const DISPLAY_UNIT: u64 = 1024 * 1024 * 1024;
const KIB_PER_DISPLAY_UNIT: u64 = 1024 * 1024;

/// Convert hertz to gigahertz, rounded to two decimals
///
/// Exact halves round away from zero (`f64::round`), not to even: 2.125 GHz
/// shows as 2.13. Halves are rarely exact in binary, so this seldom shows.
///
/// # Arguments
/// * `hz` - Frequency in hertz
///
/// # Returns
/// * Frequency in gigahertz
pub fn hz_to_ghz(hz: u64) -> f64 {
    (hz as f64 / HZ_PER_GHZ * 100.0).round() / 100.0
}

/// Convert a raw size to display units (binary giga), truncating
///
/// # Arguments
/// * `size` - Size in memory slot / export units
///
/// # Returns
/// * Whole display units, fractional part dropped
pub fn to_display_unit(size: u64) -> u64 {
    size / DISPLAY_UNIT
}

/// Convert a KiB amount (VM memory) to display units, truncating
pub fn kib_to_display_unit(kib: u64) -> u64 {
    kib / KIB_PER_DISPLAY_UNIT
}

/// Whole percentage of `part` in `whole`, truncated; 0 when `whole` is 0
pub fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (u128::from(part) * 100 / u128::from(whole)) as u64
}
