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

//! LVM export parsing functions
//!
//! Unlike the VM export, blank lines are not tolerated here: they surface as a
//! one-field malformed record.

use super::common::{parse_integer, split_record};
use crate::domain::{ParseError, PhysicalVolume, VolumeGroup};

const PV_EXPORT: &str = "pv";
const PV_FIELDS: usize = 3;
const VG_EXPORT: &str = "vg";
const VG_FIELDS: usize = 4;

/// Parse one PV export record: `name,size,free`
pub fn parse_pv_record(line: &str, line_number: usize) -> Result<PhysicalVolume, ParseError> {
    let fields = split_record(line, PV_FIELDS, PV_EXPORT, line_number)?;
    Ok(PhysicalVolume {
        name: fields[0].to_string(),
        size: parse_integer(fields[1], "pv.size")?,
        free: parse_integer(fields[2], "pv.free")?,
    })
}

/// Parse the PV export, one volume per line
///
/// # Arguments
/// * `content` - Full export contents
///
/// # Returns
/// * `Ok(Vec<PhysicalVolume>)` - Volumes in export order
/// * `Err(ParseError)` - First malformed record, blank lines included
pub fn parse_pv_export(content: &str) -> Result<Vec<PhysicalVolume>, ParseError> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| parse_pv_record(line, index + 1))
        .collect()
}

/// Parse one VG export record: `name,pv,size,free`
pub fn parse_vg_record(line: &str, line_number: usize) -> Result<VolumeGroup, ParseError> {
    let fields = split_record(line, VG_FIELDS, VG_EXPORT, line_number)?;
    Ok(VolumeGroup {
        name: fields[0].to_string(),
        pv: fields[1].to_string(),
        size: parse_integer(fields[2], "vg.size")?,
        free: parse_integer(fields[3], "vg.free")?,
    })
}

/// Parse the VG export, one group per line
pub fn parse_vg_export(content: &str) -> Result<Vec<VolumeGroup>, ParseError> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| parse_vg_record(line, index + 1))
        .collect()
}
