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

//! Report rendering
//!
//! Renderers only read the inventory through its accessors and convert units
//! on the way out; they make no decisions about the data.

pub mod csv;
pub mod html;

pub use self::csv::{vm_csv_header, vm_csv_lines, VM_CSV_HEADER};
pub use self::html::{render_host, render_index};
