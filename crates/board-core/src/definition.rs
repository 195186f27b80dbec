//! JSON board definitions.
//!
//! A definition is the hand-maintained source of a board. Keys are camelCase
//! (`landGrid`, `theftOrder`, ...), points are `{"x": 0, "y": 1}` objects and
//! missing slots are `null`. Optional fields may be left out or set to
//! `null`; either way they end up absent on the descriptor.

use crate::descriptor::{BoardDescriptor, DescriptorBuilder, NestedSeq};
use crate::hex::Point;
use crate::resource::Resource;
use crate::validate::ValidationError;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from reading a board definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("malformed board definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid board: {0}")]
    Invalid(#[from] ValidationError),
}

/// Raw field values of one board, as written in JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BoardDefinition {
    pub name: Option<String>,
    pub title: Option<String>,
    pub low_resource_number: Option<i32>,
    pub high_resource_number: Option<i32>,
    #[serde(default)]
    pub land_grid: Vec<Point>,
    #[serde(default)]
    pub land_grid_probabilities: Vec<i32>,
    #[serde(default)]
    pub land_grid_resources: Vec<Option<Resource>>,
    #[serde(default)]
    pub land_grid_whitelists: Vec<Option<String>>,
    #[serde(default)]
    pub land_resource_whitelists: BTreeMap<String, Vec<Resource>>,
    #[serde(default)]
    pub land_probability_whitelists: BTreeMap<String, Vec<i32>>,
    pub land_grid_order: Option<Vec<i32>>,
    #[serde(default)]
    pub water_grid: Vec<Point>,
    #[serde(default)]
    pub harbor_lines: NestedSeq,
    #[serde(default)]
    pub land_neighbors: NestedSeq,
    #[serde(default)]
    pub water_neighbors: NestedSeq,
    #[serde(default)]
    pub water_water_neighbors: NestedSeq,
    #[serde(default)]
    pub land_intersections: NestedSeq,
    #[serde(default)]
    pub land_intersection_indexes: NestedSeq,
    #[serde(default)]
    pub placement_indexes: NestedSeq,
    #[serde(default)]
    pub available_resources: Vec<Option<Resource>>,
    #[serde(default)]
    pub available_probabilities: Vec<i32>,
    pub available_ordered_probabilities: Option<Vec<i32>>,
    #[serde(default)]
    pub available_harbors: Vec<Option<Resource>>,
    pub ordered_harbors: Option<Vec<i32>>,
    #[serde(default)]
    pub unknown_grid: Vec<Point>,
    #[serde(default)]
    pub available_unknown_resources: Vec<Option<Resource>>,
    #[serde(default)]
    pub available_unknown_probabilities: Vec<i32>,
    #[serde(default)]
    pub placement_blacklists: Vec<Vec<i32>>,
    pub theft_order: Option<Vec<i32>>,
}

impl BoardDefinition {
    /// Parse a definition from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Feed every field into a fresh builder
    pub fn into_builder(self) -> DescriptorBuilder {
        let mut builder = DescriptorBuilder::new()
            .land_grid(self.land_grid)
            .land_grid_probabilities(self.land_grid_probabilities)
            .land_grid_resources(self.land_grid_resources)
            .land_grid_whitelists(self.land_grid_whitelists)
            .land_resource_whitelists(self.land_resource_whitelists)
            .land_probability_whitelists(self.land_probability_whitelists)
            .water_grid(self.water_grid)
            .harbor_lines(self.harbor_lines)
            .land_neighbors(self.land_neighbors)
            .water_neighbors(self.water_neighbors)
            .water_water_neighbors(self.water_water_neighbors)
            .land_intersections(self.land_intersections)
            .land_intersection_indexes(self.land_intersection_indexes)
            .placement_indexes(self.placement_indexes)
            .available_resources(self.available_resources)
            .available_probabilities(self.available_probabilities)
            .available_harbors(self.available_harbors)
            .unknown_grid(self.unknown_grid)
            .available_unknown_resources(self.available_unknown_resources)
            .available_unknown_probabilities(self.available_unknown_probabilities)
            .placement_blacklists(self.placement_blacklists);

        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        if let Some(n) = self.low_resource_number {
            builder = builder.low_resource_number(n);
        }
        if let Some(n) = self.high_resource_number {
            builder = builder.high_resource_number(n);
        }
        if let Some(order) = self.land_grid_order {
            builder = builder.land_grid_order(order);
        }
        if let Some(probabilities) = self.available_ordered_probabilities {
            builder = builder.available_ordered_probabilities(probabilities);
        }
        if let Some(harbors) = self.ordered_harbors {
            builder = builder.ordered_harbors(harbors);
        }
        if let Some(order) = self.theft_order {
            builder = builder.theft_order(order);
        }
        builder
    }
}

/// Decode JSON bytes into a builder, leaving validation to `build`.
pub fn decode_definition(bytes: &[u8]) -> Result<DescriptorBuilder, DefinitionError> {
    Ok(BoardDefinition::from_slice(bytes)?.into_builder())
}

/// Decode and validate a board in one step.
pub fn decode_board(bytes: &[u8]) -> Result<BoardDescriptor, DefinitionError> {
    Ok(decode_definition(bytes)?.build()?)
}
