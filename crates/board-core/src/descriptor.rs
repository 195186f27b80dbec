//! Board descriptor: the complete topology and resource data of one board.
//!
//! This module contains:
//! - `BoardDescriptor`, the immutable validated board model
//! - `DescriptorBuilder`, the field-by-field accumulator that produces it
//!
//! Tiles are referred to by their index in `land_grid` or `water_grid`.
//! Sequences whose slots may be missing hold `Option` values; fields that may
//! be absent altogether are `Option<Vec<_>>` on the descriptor.

use crate::emitter::field;
use crate::hex::Point;
use crate::resource::Resource;
use crate::validate::{validate, ValidationError};
use std::collections::BTreeMap;
use std::fmt;

/// Sequence of integer sequences where each inner slot may be missing
pub type NestedSeq = Vec<Option<Vec<i32>>>;

/// Whitelist groups keyed by group name, iterated in key order
pub type Whitelists<T> = BTreeMap<String, Vec<T>>;

/// Immutable description of one board.
///
/// Only obtainable through [`DescriptorBuilder::build`] (or the artifact
/// loader, which uses the builder), so every instance has passed structural
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardDescriptor {
    pub(crate) name: String,
    pub(crate) title: String,
    pub(crate) low_resource_number: i32,
    pub(crate) high_resource_number: i32,
    pub(crate) land_grid: Vec<Point>,
    pub(crate) land_grid_probabilities: Vec<i32>,
    pub(crate) land_grid_resources: Vec<Option<Resource>>,
    pub(crate) land_grid_whitelists: Vec<Option<String>>,
    pub(crate) land_resource_whitelists: Whitelists<Resource>,
    pub(crate) land_probability_whitelists: Whitelists<i32>,
    pub(crate) land_grid_order: Option<Vec<i32>>,
    pub(crate) water_grid: Vec<Point>,
    pub(crate) harbor_lines: NestedSeq,
    pub(crate) land_neighbors: NestedSeq,
    pub(crate) water_neighbors: NestedSeq,
    pub(crate) water_water_neighbors: NestedSeq,
    pub(crate) land_intersections: NestedSeq,
    pub(crate) land_intersection_indexes: NestedSeq,
    pub(crate) placement_indexes: NestedSeq,
    pub(crate) available_resources: Vec<Option<Resource>>,
    pub(crate) available_probabilities: Vec<i32>,
    pub(crate) available_ordered_probabilities: Option<Vec<i32>>,
    pub(crate) available_harbors: Vec<Option<Resource>>,
    pub(crate) ordered_harbors: Option<Vec<i32>>,
    pub(crate) unknown_grid: Vec<Point>,
    pub(crate) available_unknown_resources: Vec<Option<Resource>>,
    pub(crate) available_unknown_probabilities: Vec<i32>,
    pub(crate) placement_blacklists: Vec<Vec<i32>>,
    pub(crate) theft_order: Option<Vec<i32>>,
}

impl BoardDescriptor {
    /// Start a new builder
    pub fn builder() -> DescriptorBuilder {
        DescriptorBuilder::new()
    }

    /// Reopen this descriptor as a builder holding the same values
    pub fn to_builder(&self) -> DescriptorBuilder {
        DescriptorBuilder {
            name: Some(self.name.clone()),
            title: Some(self.title.clone()),
            low_resource_number: Some(self.low_resource_number),
            high_resource_number: Some(self.high_resource_number),
            land_grid: self.land_grid.clone(),
            land_grid_probabilities: self.land_grid_probabilities.clone(),
            land_grid_resources: self.land_grid_resources.clone(),
            land_grid_whitelists: self.land_grid_whitelists.clone(),
            land_resource_whitelists: self.land_resource_whitelists.clone(),
            land_probability_whitelists: self.land_probability_whitelists.clone(),
            land_grid_order: self.land_grid_order.clone(),
            water_grid: self.water_grid.clone(),
            harbor_lines: self.harbor_lines.clone(),
            land_neighbors: self.land_neighbors.clone(),
            water_neighbors: self.water_neighbors.clone(),
            water_water_neighbors: self.water_water_neighbors.clone(),
            land_intersections: self.land_intersections.clone(),
            land_intersection_indexes: self.land_intersection_indexes.clone(),
            placement_indexes: self.placement_indexes.clone(),
            available_resources: self.available_resources.clone(),
            available_probabilities: self.available_probabilities.clone(),
            available_ordered_probabilities: self.available_ordered_probabilities.clone(),
            available_harbors: self.available_harbors.clone(),
            ordered_harbors: self.ordered_harbors.clone(),
            unknown_grid: self.unknown_grid.clone(),
            available_unknown_resources: self.available_unknown_resources.clone(),
            available_unknown_probabilities: self.available_unknown_probabilities.clone(),
            placement_blacklists: self.placement_blacklists.clone(),
            theft_order: self.theft_order.clone(),
        }
    }

    /// Internal name of the board
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title of the board
    pub fn title(&self) -> &str {
        &self.title
    }

    /// How many of each scarce resource (ore, brick) are distributed
    pub fn low_resource_number(&self) -> i32 {
        self.low_resource_number
    }

    /// How many of each common resource (wood, wheat, sheep) are distributed
    pub fn high_resource_number(&self) -> i32 {
        self.high_resource_number
    }

    /// Coordinates of each land tile
    pub fn land_grid(&self) -> &[Point] {
        &self.land_grid
    }

    /// Fixed probability of each land tile
    pub fn land_grid_probabilities(&self) -> &[i32] {
        &self.land_grid_probabilities
    }

    /// Fixed resource of each land tile, if assigned
    pub fn land_grid_resources(&self) -> &[Option<Resource>] {
        &self.land_grid_resources
    }

    /// Whitelist group key of each land tile, if any
    pub fn land_grid_whitelists(&self) -> &[Option<String>] {
        &self.land_grid_whitelists
    }

    /// Resources allowed per whitelist group
    pub fn land_resource_whitelists(&self) -> &Whitelists<Resource> {
        &self.land_resource_whitelists
    }

    /// Probabilities allowed per whitelist group
    pub fn land_probability_whitelists(&self) -> &Whitelists<i32> {
        &self.land_probability_whitelists
    }

    /// Order in which land tiles are laid out
    pub fn land_grid_order(&self) -> Option<&[i32]> {
        self.land_grid_order.as_deref()
    }

    /// Coordinates of each water tile
    pub fn water_grid(&self) -> &[Point] {
        &self.water_grid
    }

    /// Corners touched by each harbor's trade lines
    pub fn harbor_lines(&self) -> &NestedSeq {
        &self.harbor_lines
    }

    /// Land tiles adjacent to each land tile
    pub fn land_neighbors(&self) -> &NestedSeq {
        &self.land_neighbors
    }

    /// Land tiles adjacent to each water tile
    pub fn water_neighbors(&self) -> &NestedSeq {
        &self.water_neighbors
    }

    /// Water tiles adjacent to each water tile
    pub fn water_water_neighbors(&self) -> &NestedSeq {
        &self.water_water_neighbors
    }

    /// Triplets of land tiles meeting at a vertex
    pub fn land_intersections(&self) -> &NestedSeq {
        &self.land_intersections
    }

    /// Intersections each land tile takes part in
    pub fn land_intersection_indexes(&self) -> &NestedSeq {
        &self.land_intersection_indexes
    }

    /// `(tile, direction)` slots between tiles
    pub fn placement_indexes(&self) -> &NestedSeq {
        &self.placement_indexes
    }

    pub fn available_resources(&self) -> &[Option<Resource>] {
        &self.available_resources
    }

    pub fn available_probabilities(&self) -> &[i32] {
        &self.available_probabilities
    }

    pub fn available_ordered_probabilities(&self) -> Option<&[i32]> {
        self.available_ordered_probabilities.as_deref()
    }

    pub fn available_harbors(&self) -> &[Option<Resource>] {
        &self.available_harbors
    }

    pub fn ordered_harbors(&self) -> Option<&[i32]> {
        self.ordered_harbors.as_deref()
    }

    /// Coordinates of tiles whose contents are revealed during play
    pub fn unknown_grid(&self) -> &[Point] {
        &self.unknown_grid
    }

    pub fn available_unknown_resources(&self) -> &[Option<Resource>] {
        &self.available_unknown_resources
    }

    pub fn available_unknown_probabilities(&self) -> &[i32] {
        &self.available_unknown_probabilities
    }

    /// Disallowed placements per piece
    pub fn placement_blacklists(&self) -> &[Vec<i32>] {
        &self.placement_blacklists
    }

    /// Order in which land tiles are converted to water
    pub fn theft_order(&self) -> Option<&[i32]> {
        self.theft_order.as_deref()
    }

    /// Number of land tiles
    pub fn land_tile_count(&self) -> usize {
        self.land_grid.len()
    }

    /// Number of water tiles
    pub fn water_tile_count(&self) -> usize {
        self.water_grid.len()
    }

    /// Run the structural checks again
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(self)
    }
}

/// One-line summary: title, tile counts, number range and which optional
/// fields are present.
impl fmt::Display for BoardDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} land, {} water, {} unknown tiles, numbers {}..={}",
            self.title,
            self.name,
            self.land_tile_count(),
            self.water_tile_count(),
            self.unknown_grid.len(),
            self.low_resource_number,
            self.high_resource_number,
        )?;

        let optional = [
            (field::LAND_GRID_ORDER, self.land_grid_order.is_some()),
            (
                field::AVAILABLE_ORDERED_PROBABILITIES,
                self.available_ordered_probabilities.is_some(),
            ),
            (field::ORDERED_HARBORS, self.ordered_harbors.is_some()),
            (field::THEFT_ORDER, self.theft_order.is_some()),
        ];
        let present: Vec<&str> = optional
            .iter()
            .filter(|(_, set)| *set)
            .map(|(key, _)| *key)
            .collect();
        if present.is_empty() {
            write!(f, "; no optional fields")
        } else {
            write!(f, "; with {}", present.join(", "))
        }
    }
}

/// Accumulates field values for one board.
///
/// Each setter takes the builder by value and returns it, so a board can be
/// described in one chain. [`build`](Self::build) consumes the builder.
///
/// Unset sequences are empty, unset optional fields stay absent, and unset
/// scalars are reported as missing.
#[derive(Debug, Clone, Default)]
pub struct DescriptorBuilder {
    name: Option<String>,
    title: Option<String>,
    low_resource_number: Option<i32>,
    high_resource_number: Option<i32>,
    land_grid: Vec<Point>,
    land_grid_probabilities: Vec<i32>,
    land_grid_resources: Vec<Option<Resource>>,
    land_grid_whitelists: Vec<Option<String>>,
    land_resource_whitelists: Whitelists<Resource>,
    land_probability_whitelists: Whitelists<i32>,
    land_grid_order: Option<Vec<i32>>,
    water_grid: Vec<Point>,
    harbor_lines: NestedSeq,
    land_neighbors: NestedSeq,
    water_neighbors: NestedSeq,
    water_water_neighbors: NestedSeq,
    land_intersections: NestedSeq,
    land_intersection_indexes: NestedSeq,
    placement_indexes: NestedSeq,
    available_resources: Vec<Option<Resource>>,
    available_probabilities: Vec<i32>,
    available_ordered_probabilities: Option<Vec<i32>>,
    available_harbors: Vec<Option<Resource>>,
    ordered_harbors: Option<Vec<i32>>,
    unknown_grid: Vec<Point>,
    available_unknown_resources: Vec<Option<Resource>>,
    available_unknown_probabilities: Vec<i32>,
    placement_blacklists: Vec<Vec<i32>>,
    theft_order: Option<Vec<i32>>,
}

impl DescriptorBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn low_resource_number(mut self, n: i32) -> Self {
        self.low_resource_number = Some(n);
        self
    }

    pub fn high_resource_number(mut self, n: i32) -> Self {
        self.high_resource_number = Some(n);
        self
    }

    pub fn land_grid(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.land_grid = points.into_iter().collect();
        self
    }

    pub fn land_grid_probabilities(mut self, probabilities: Vec<i32>) -> Self {
        self.land_grid_probabilities = probabilities;
        self
    }

    pub fn land_grid_resources(mut self, resources: Vec<Option<Resource>>) -> Self {
        self.land_grid_resources = resources;
        self
    }

    pub fn land_grid_whitelists(mut self, keys: Vec<Option<String>>) -> Self {
        self.land_grid_whitelists = keys;
        self
    }

    /// Set the resource whitelist groups. A repeated key keeps its last value.
    pub fn land_resource_whitelists(
        mut self,
        groups: impl IntoIterator<Item = (String, Vec<Resource>)>,
    ) -> Self {
        self.land_resource_whitelists = groups.into_iter().collect();
        self
    }

    /// Set the probability whitelist groups. A repeated key keeps its last value.
    pub fn land_probability_whitelists(
        mut self,
        groups: impl IntoIterator<Item = (String, Vec<i32>)>,
    ) -> Self {
        self.land_probability_whitelists = groups.into_iter().collect();
        self
    }

    pub fn land_grid_order(mut self, order: Vec<i32>) -> Self {
        self.land_grid_order = Some(order);
        self
    }

    pub fn water_grid(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.water_grid = points.into_iter().collect();
        self
    }

    pub fn harbor_lines(mut self, lines: NestedSeq) -> Self {
        self.harbor_lines = lines;
        self
    }

    pub fn land_neighbors(mut self, neighbors: NestedSeq) -> Self {
        self.land_neighbors = neighbors;
        self
    }

    pub fn water_neighbors(mut self, neighbors: NestedSeq) -> Self {
        self.water_neighbors = neighbors;
        self
    }

    pub fn water_water_neighbors(mut self, neighbors: NestedSeq) -> Self {
        self.water_water_neighbors = neighbors;
        self
    }

    pub fn land_intersections(mut self, intersections: NestedSeq) -> Self {
        self.land_intersections = intersections;
        self
    }

    pub fn land_intersection_indexes(mut self, indexes: NestedSeq) -> Self {
        self.land_intersection_indexes = indexes;
        self
    }

    pub fn placement_indexes(mut self, indexes: NestedSeq) -> Self {
        self.placement_indexes = indexes;
        self
    }

    pub fn available_resources(mut self, resources: Vec<Option<Resource>>) -> Self {
        self.available_resources = resources;
        self
    }

    pub fn available_probabilities(mut self, probabilities: Vec<i32>) -> Self {
        self.available_probabilities = probabilities;
        self
    }

    pub fn available_ordered_probabilities(mut self, probabilities: Vec<i32>) -> Self {
        self.available_ordered_probabilities = Some(probabilities);
        self
    }

    pub fn available_harbors(mut self, harbors: Vec<Option<Resource>>) -> Self {
        self.available_harbors = harbors;
        self
    }

    pub fn ordered_harbors(mut self, harbors: Vec<i32>) -> Self {
        self.ordered_harbors = Some(harbors);
        self
    }

    pub fn unknown_grid(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.unknown_grid = points.into_iter().collect();
        self
    }

    pub fn available_unknown_resources(mut self, resources: Vec<Option<Resource>>) -> Self {
        self.available_unknown_resources = resources;
        self
    }

    pub fn available_unknown_probabilities(mut self, probabilities: Vec<i32>) -> Self {
        self.available_unknown_probabilities = probabilities;
        self
    }

    pub fn placement_blacklists(mut self, blacklists: Vec<Vec<i32>>) -> Self {
        self.placement_blacklists = blacklists;
        self
    }

    pub fn theft_order(mut self, order: Vec<i32>) -> Self {
        self.theft_order = Some(order);
        self
    }

    /// Finish the board, running all structural checks.
    pub fn build(self) -> Result<BoardDescriptor, ValidationError> {
        let descriptor = BoardDescriptor {
            name: self.name.ok_or(ValidationError::MissingField("name"))?,
            title: self.title.ok_or(ValidationError::MissingField("title"))?,
            low_resource_number: self
                .low_resource_number
                .ok_or(ValidationError::MissingField("low_resource_number"))?,
            high_resource_number: self
                .high_resource_number
                .ok_or(ValidationError::MissingField("high_resource_number"))?,
            land_grid: self.land_grid,
            land_grid_probabilities: self.land_grid_probabilities,
            land_grid_resources: self.land_grid_resources,
            land_grid_whitelists: self.land_grid_whitelists,
            land_resource_whitelists: self.land_resource_whitelists,
            land_probability_whitelists: self.land_probability_whitelists,
            land_grid_order: self.land_grid_order,
            water_grid: self.water_grid,
            harbor_lines: self.harbor_lines,
            land_neighbors: self.land_neighbors,
            water_neighbors: self.water_neighbors,
            water_water_neighbors: self.water_water_neighbors,
            land_intersections: self.land_intersections,
            land_intersection_indexes: self.land_intersection_indexes,
            placement_indexes: self.placement_indexes,
            available_resources: self.available_resources,
            available_probabilities: self.available_probabilities,
            available_ordered_probabilities: self.available_ordered_probabilities,
            available_harbors: self.available_harbors,
            ordered_harbors: self.ordered_harbors,
            unknown_grid: self.unknown_grid,
            available_unknown_resources: self.available_unknown_resources,
            available_unknown_probabilities: self.available_unknown_probabilities,
            placement_blacklists: self.placement_blacklists,
            theft_order: self.theft_order,
        };

        validate(&descriptor)?;
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tile_builder() -> DescriptorBuilder {
        BoardDescriptor::builder()
            .name("Standard")
            .title("Standard Map")
            .low_resource_number(3)
            .high_resource_number(4)
            .land_grid([Point::new(0, 0), Point::new(1, 0)])
            .land_grid_probabilities(vec![5, 9])
            .land_grid_resources(vec![Some(Resource::Wood), None])
            .land_grid_whitelists(vec![None, Some("A".to_string())])
            .land_resource_whitelists([(
                "A".to_string(),
                vec![Resource::Wood, Resource::Brick],
            )])
    }

    #[test]
    fn test_build_minimal_board() {
        let board = two_tile_builder().build().unwrap();
        assert_eq!(board.name(), "Standard");
        assert_eq!(board.title(), "Standard Map");
        assert_eq!(board.land_tile_count(), 2);
        assert_eq!(board.water_tile_count(), 0);
        assert!(board.placement_blacklists().is_empty());
    }

    #[test]
    fn test_optional_fields_default_to_absent() {
        let board = two_tile_builder().build().unwrap();
        assert!(board.land_grid_order().is_none());
        assert!(board.available_ordered_probabilities().is_none());
        assert!(board.ordered_harbors().is_none());
        assert!(board.theft_order().is_none());
    }

    #[test]
    fn test_present_but_empty_is_not_absent() {
        let board = two_tile_builder().theft_order(vec![]).build().unwrap();
        assert_eq!(board.theft_order(), Some(&[][..]));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = BoardDescriptor::builder()
            .title("t")
            .low_resource_number(1)
            .high_resource_number(1)
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }

    #[test]
    fn test_repeated_whitelist_key_keeps_last() {
        let board = two_tile_builder()
            .land_resource_whitelists([
                ("A".to_string(), vec![Resource::Ore]),
                ("A".to_string(), vec![Resource::Gold]),
            ])
            .build()
            .unwrap();
        assert_eq!(board.land_resource_whitelists()["A"], vec![Resource::Gold]);
    }

    #[test]
    fn test_to_builder_reproduces_descriptor() {
        let board = two_tile_builder()
            .land_grid_order(vec![1, 0])
            .build()
            .unwrap();
        let copy = board.to_builder().build().unwrap();
        assert_eq!(board, copy);
    }

    #[test]
    fn test_display_summary() {
        let board = two_tile_builder().build().unwrap();
        assert_eq!(
            board.to_string(),
            "Standard Map (Standard): 2 land, 0 water, 0 unknown tiles, numbers 3..=4; no optional fields"
        );

        let board = two_tile_builder()
            .theft_order(vec![])
            .land_grid_order(vec![1, 0])
            .build()
            .unwrap();
        assert!(board
            .to_string()
            .ends_with("; with land_grid_order, theft_order"));
    }
}
