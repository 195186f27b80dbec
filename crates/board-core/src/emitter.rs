//! Top-level artifact layout.
//!
//! An artifact is a versioned, declarative text file holding one board:
//!
//! ```text
//! # Board artifact. Generated file, do not edit.
//! version = 1;
//! artifact = "Standard";
//!
//! name = "Standard";
//! ...
//! ```
//!
//! Statements appear in a fixed order, whitelist groups in key order, so the
//! same descriptor always yields the same bytes. Optional fields that are
//! absent produce no statement; see [`crate::loader`] for reading it back.

use crate::descriptor::BoardDescriptor;
use crate::render;
use crate::validate::ValidationError;
use std::fmt::Write;

/// Artifact format version written in the header
pub const FORMAT_VERSION: i32 = 1;

/// First line of every artifact
pub const HEADER_COMMENT: &str = "# Board artifact. Generated file, do not edit.";

/// Default indent width for sequence elements
pub const DEFAULT_INDENT: usize = 4;

/// Statement keys shared by the emitter and the loader.
pub(crate) mod field {
    pub const VERSION: &str = "version";
    pub const ARTIFACT: &str = "artifact";

    pub const NAME: &str = "name";
    pub const TITLE: &str = "title";
    pub const LOW_RESOURCE_NUMBER: &str = "low_resource_number";
    pub const HIGH_RESOURCE_NUMBER: &str = "high_resource_number";
    pub const LAND_GRID: &str = "land_grid";
    pub const LAND_GRID_WHITELISTS: &str = "land_grid_whitelists";
    pub const LAND_GRID_PROBABILITIES: &str = "land_grid_probabilities";
    pub const LAND_GRID_RESOURCES: &str = "land_grid_resources";
    pub const WATER_GRID: &str = "water_grid";
    pub const HARBOR_LINES: &str = "harbor_lines";
    pub const LAND_NEIGHBORS: &str = "land_neighbors";
    pub const WATER_NEIGHBORS: &str = "water_neighbors";
    pub const WATER_WATER_NEIGHBORS: &str = "water_water_neighbors";
    pub const LAND_INTERSECTIONS: &str = "land_intersections";
    pub const LAND_INTERSECTION_INDEXES: &str = "land_intersection_indexes";
    pub const PLACEMENT_INDEXES: &str = "placement_indexes";
    pub const AVAILABLE_RESOURCES: &str = "available_resources";
    pub const AVAILABLE_PROBABILITIES: &str = "available_probabilities";
    pub const AVAILABLE_HARBORS: &str = "available_harbors";
    pub const AVAILABLE_UNKNOWN_RESOURCES: &str = "available_unknown_resources";
    pub const AVAILABLE_UNKNOWN_PROBABILITIES: &str = "available_unknown_probabilities";
    pub const UNKNOWN_GRID: &str = "unknown_grid";
    pub const LAND_RESOURCE_WHITELISTS: &str = "land_resource_whitelists";
    pub const LAND_PROBABILITY_WHITELISTS: &str = "land_probability_whitelists";
    pub const PLACEMENT_BLACKLISTS: &str = "placement_blacklists";
    pub const LAND_GRID_ORDER: &str = "land_grid_order";
    pub const AVAILABLE_ORDERED_PROBABILITIES: &str = "available_ordered_probabilities";
    pub const ORDERED_HARBORS: &str = "ordered_harbors";
    pub const THEFT_ORDER: &str = "theft_order";
}

/// Binding name prefix for resource whitelist groups
pub const RESOURCE_WHITELIST_BINDING: &str = "resource_whitelist";

/// Binding name prefix for probability whitelist groups
pub const PROBABILITY_WHITELIST_BINDING: &str = "probability_whitelist";

/// Serializes validated descriptors into artifact text.
#[derive(Debug, Clone)]
pub struct ArtifactEmitter {
    pad: String,
}

impl Default for ArtifactEmitter {
    fn default() -> Self {
        Self::with_indent(DEFAULT_INDENT)
    }
}

impl ArtifactEmitter {
    /// Emitter with the default indent
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter indenting sequence elements by `indent` spaces
    pub fn with_indent(indent: usize) -> Self {
        Self {
            pad: " ".repeat(indent),
        }
    }

    /// Render `board` as a complete artifact called `artifact_name`.
    ///
    /// The board is validated again first; a structurally broken board never
    /// produces an artifact.
    pub fn render(
        &self,
        board: &BoardDescriptor,
        artifact_name: &str,
    ) -> Result<String, ValidationError> {
        board.validate()?;

        let pad = self.pad.as_str();
        let mut out = String::new();

        let _ = writeln!(out, "{HEADER_COMMENT}");
        statement(&mut out, field::VERSION, FORMAT_VERSION.to_string());
        statement(&mut out, field::ARTIFACT, render::quote(artifact_name));
        out.push('\n');

        statement(&mut out, field::NAME, render::quote(&board.name));
        statement(&mut out, field::TITLE, render::quote(&board.title));
        statement(
            &mut out,
            field::LOW_RESOURCE_NUMBER,
            board.low_resource_number.to_string(),
        );
        statement(
            &mut out,
            field::HIGH_RESOURCE_NUMBER,
            board.high_resource_number.to_string(),
        );
        statement(&mut out, field::LAND_GRID, render::point_seq(&board.land_grid, pad));
        statement(
            &mut out,
            field::LAND_GRID_WHITELISTS,
            render::string_seq(&board.land_grid_whitelists, pad),
        );
        statement(
            &mut out,
            field::LAND_GRID_PROBABILITIES,
            render::int_seq(&board.land_grid_probabilities, pad),
        );
        statement(
            &mut out,
            field::LAND_GRID_RESOURCES,
            render::label_seq(&board.land_grid_resources, pad),
        );
        statement(&mut out, field::WATER_GRID, render::point_seq(&board.water_grid, pad));

        let topology = [
            (field::HARBOR_LINES, &board.harbor_lines),
            (field::LAND_NEIGHBORS, &board.land_neighbors),
            (field::WATER_NEIGHBORS, &board.water_neighbors),
            (field::WATER_WATER_NEIGHBORS, &board.water_water_neighbors),
            (field::LAND_INTERSECTIONS, &board.land_intersections),
            (field::LAND_INTERSECTION_INDEXES, &board.land_intersection_indexes),
            (field::PLACEMENT_INDEXES, &board.placement_indexes),
        ];
        for (key, seq) in topology {
            statement(&mut out, key, render::nested_seq(seq, pad));
        }

        statement(
            &mut out,
            field::AVAILABLE_RESOURCES,
            render::label_seq(&board.available_resources, pad),
        );
        statement(
            &mut out,
            field::AVAILABLE_PROBABILITIES,
            render::int_seq(&board.available_probabilities, pad),
        );
        statement(
            &mut out,
            field::AVAILABLE_HARBORS,
            render::label_seq(&board.available_harbors, pad),
        );
        statement(
            &mut out,
            field::AVAILABLE_UNKNOWN_RESOURCES,
            render::label_seq(&board.available_unknown_resources, pad),
        );
        statement(
            &mut out,
            field::AVAILABLE_UNKNOWN_PROBABILITIES,
            render::int_seq(&board.available_unknown_probabilities, pad),
        );
        statement(&mut out, field::UNKNOWN_GRID, render::point_seq(&board.unknown_grid, pad));

        out.push('\n');
        out.push_str(&render::association(
            field::LAND_RESOURCE_WHITELISTS,
            RESOURCE_WHITELIST_BINDING,
            &board.land_resource_whitelists,
            render::dense_label_seq,
            pad,
        ));

        out.push('\n');
        out.push_str(&render::association(
            field::LAND_PROBABILITY_WHITELISTS,
            PROBABILITY_WHITELIST_BINDING,
            &board.land_probability_whitelists,
            render::int_seq,
            pad,
        ));

        out.push('\n');
        statement(
            &mut out,
            field::PLACEMENT_BLACKLISTS,
            render::list_seq(&board.placement_blacklists, pad),
        );

        // Absent optional fields get no statement at all
        let optional = [
            (field::LAND_GRID_ORDER, &board.land_grid_order),
            (
                field::AVAILABLE_ORDERED_PROBABILITIES,
                &board.available_ordered_probabilities,
            ),
            (field::ORDERED_HARBORS, &board.ordered_harbors),
            (field::THEFT_ORDER, &board.theft_order),
        ];
        for (key, values) in optional {
            if let Some(values) = values {
                statement(&mut out, key, render::int_seq(values, pad));
            }
        }

        Ok(out)
    }
}

fn statement(out: &mut String, key: &str, value: String) {
    let _ = writeln!(out, "{key} = {value};");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::Point;
    use crate::resource::Resource;

    fn scenario_a() -> BoardDescriptor {
        BoardDescriptor::builder()
            .name("Standard")
            .title("Standard")
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
            .build()
            .unwrap()
    }

    #[test]
    fn test_header() {
        let text = ArtifactEmitter::new().render(&scenario_a(), "Standard").unwrap();
        assert!(text.starts_with(
            "# Board artifact. Generated file, do not edit.\nversion = 1;\nartifact = \"Standard\";\n"
        ));
        assert!(text.ends_with(";\n"));
    }

    #[test]
    fn test_scenario_a_contents() {
        let text = ArtifactEmitter::new().render(&scenario_a(), "Standard").unwrap();

        assert!(text.contains("land_grid = [\n    (0, 0),\n    (1, 0)\n];\n"));
        assert!(text.contains("land_grid_resources = [\n    WOOD,\n    null\n];\n"));
        assert!(text.contains("land_grid_whitelists = [\n    null,\n    \"A\"\n];\n"));
        assert!(text.contains("let resource_whitelist_0 = [\n    WOOD,\n    BRICK\n];\n"));
        assert!(text.contains("land_resource_whitelists = {\n    \"A\": resource_whitelist_0\n};\n"));
        assert_eq!(text.matches("let ").count(), 1);
        assert!(text.contains("land_probability_whitelists = {};\n"));
    }

    #[test]
    fn test_absent_theft_order_is_omitted() {
        let text = ArtifactEmitter::new().render(&scenario_a(), "Standard").unwrap();
        assert!(!text.contains("theft_order"));
        assert!(!text.contains("land_grid_order"));
        assert!(!text.contains("ordered_harbors"));
    }

    #[test]
    fn test_empty_theft_order_is_emitted() {
        let board = scenario_a().to_builder().theft_order(vec![]).build().unwrap();
        let text = ArtifactEmitter::new().render(&board, "Standard").unwrap();
        assert!(text.contains("theft_order = [];\n"));
    }

    #[test]
    fn test_empty_blacklists_are_emitted() {
        let text = ArtifactEmitter::new().render(&scenario_a(), "Standard").unwrap();
        assert!(text.contains("placement_blacklists = [];\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let board = scenario_a()
            .to_builder()
            .land_probability_whitelists([
                ("z".to_string(), vec![2]),
                ("b".to_string(), vec![3]),
                ("m".to_string(), vec![4]),
            ])
            .build()
            .unwrap();
        let emitter = ArtifactEmitter::new();
        let first = emitter.render(&board, "Standard").unwrap();
        let second = emitter.render(&board, "Standard").unwrap();
        assert_eq!(first, second);

        let b = first.find("\"b\": ").unwrap();
        let m = first.find("\"m\": ").unwrap();
        let z = first.find("\"z\": ").unwrap();
        assert!(b < m && m < z);
    }

    #[test]
    fn test_strings_are_escaped() {
        let board = scenario_a()
            .to_builder()
            .title("The \"Big\" One\\\n")
            .build()
            .unwrap();
        let text = ArtifactEmitter::new().render(&board, "Big").unwrap();
        assert!(text.contains(r#"title = "The \"Big\" One\\\n";"#));
    }

    #[test]
    fn test_custom_indent() {
        let text = ArtifactEmitter::with_indent(2).render(&scenario_a(), "S").unwrap();
        assert!(text.contains("land_grid_probabilities = [\n  5,\n  9\n];\n"));
    }
}
