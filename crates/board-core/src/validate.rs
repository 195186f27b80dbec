//! Structural checks run before a descriptor is handed out or emitted.
//!
//! These only verify that the board is internally consistent: aligned
//! sequences, in-range tile references, known whitelist groups and sane
//! harbor geometry. Whether the board is fun to play is not checked.

use crate::descriptor::BoardDescriptor;
use crate::hex::{is_corner, MAX_HARBOR_CORNERS, MIN_HARBOR_CORNERS};
use thiserror::Error;

/// A violated structural invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{0}' was never set")]
    MissingField(&'static str),

    #[error(
        "land tile sequences must be index-aligned: '{field}' has {found} entries but land_grid has {expected}"
    )]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "'{field}' entry {entry} references index {index}, but '{target}' only has {bound} entries"
    )]
    TileIndexOutOfRange {
        field: &'static str,
        target: &'static str,
        entry: usize,
        index: i32,
        bound: usize,
    },

    #[error("land tile {tile} uses whitelist group '{key}', which no whitelist defines")]
    UnknownWhitelistKey { tile: usize, key: String },

    #[error("harbor line {entry} must touch 2 or 3 distinct corners in 0..=5, got {corners:?}")]
    InvalidHarborLine { entry: usize, corners: Vec<i32> },
}

/// Check every structural invariant of `board`, reporting the first violation.
pub fn validate(board: &BoardDescriptor) -> Result<(), ValidationError> {
    check_alignment(board)?;
    check_references(board)?;
    check_whitelist_keys(board)?;
    check_harbor_lines(board)?;
    Ok(())
}

fn check_alignment(board: &BoardDescriptor) -> Result<(), ValidationError> {
    let expected = board.land_grid.len();
    let aligned = [
        ("land_grid_probabilities", board.land_grid_probabilities.len()),
        ("land_grid_resources", board.land_grid_resources.len()),
        ("land_grid_whitelists", board.land_grid_whitelists.len()),
    ];

    for (field, found) in aligned {
        if found != expected {
            return Err(ValidationError::LengthMismatch {
                field,
                expected,
                found,
            });
        }
    }
    Ok(())
}

fn check_references(board: &BoardDescriptor) -> Result<(), ValidationError> {
    let land = board.land_grid.len();
    let water = board.water_grid.len();
    let intersections = board.land_intersections.len();

    let nested = [
        ("land_neighbors", &board.land_neighbors, "land_grid", land),
        ("water_neighbors", &board.water_neighbors, "land_grid", land),
        ("water_water_neighbors", &board.water_water_neighbors, "water_grid", water),
        ("land_intersections", &board.land_intersections, "land_grid", land),
        (
            "land_intersection_indexes",
            &board.land_intersection_indexes,
            "land_intersections",
            intersections,
        ),
    ];

    for (field, seq, target, bound) in nested {
        let entries = seq
            .iter()
            .enumerate()
            .filter_map(|(entry, slot)| slot.as_deref().map(|ids| (entry, ids)));
        check_indexes(field, target, bound, entries)?;
    }

    let blacklists = board
        .placement_blacklists
        .iter()
        .enumerate()
        .map(|(entry, ids)| (entry, ids.as_slice()));
    check_indexes("placement_blacklists", "land_grid", land, blacklists)
}

fn check_indexes<'a>(
    field: &'static str,
    target: &'static str,
    bound: usize,
    entries: impl Iterator<Item = (usize, &'a [i32])>,
) -> Result<(), ValidationError> {
    for (entry, ids) in entries {
        for &index in ids {
            let in_range = usize::try_from(index).map_or(false, |i| i < bound);
            if !in_range {
                return Err(ValidationError::TileIndexOutOfRange {
                    field,
                    target,
                    entry,
                    index,
                    bound,
                });
            }
        }
    }
    Ok(())
}

fn check_whitelist_keys(board: &BoardDescriptor) -> Result<(), ValidationError> {
    for (tile, key) in board.land_grid_whitelists.iter().enumerate() {
        let Some(key) = key else { continue };
        let known = board.land_resource_whitelists.contains_key(key)
            || board.land_probability_whitelists.contains_key(key);
        if !known {
            return Err(ValidationError::UnknownWhitelistKey {
                tile,
                key: key.clone(),
            });
        }
    }
    Ok(())
}

fn check_harbor_lines(board: &BoardDescriptor) -> Result<(), ValidationError> {
    for (entry, line) in board.harbor_lines.iter().enumerate() {
        let Some(corners) = line else { continue };

        let size_ok = (MIN_HARBOR_CORNERS..=MAX_HARBOR_CORNERS).contains(&corners.len());
        let corners_ok = corners.iter().all(|&c| is_corner(c));
        let distinct = corners
            .iter()
            .enumerate()
            .all(|(i, c)| !corners[..i].contains(c));

        if !(size_ok && corners_ok && distinct) {
            return Err(ValidationError::InvalidHarborLine {
                entry,
                corners: corners.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorBuilder;
    use crate::hex::Point;
    use crate::resource::Resource;

    fn base() -> DescriptorBuilder {
        DescriptorBuilder::new()
            .name("Test")
            .title("Test")
            .low_resource_number(1)
            .high_resource_number(2)
            .land_grid([Point::new(0, 0), Point::new(1, 0), Point::new(0, 1)])
            .land_grid_probabilities(vec![2, 3, 4])
            .land_grid_resources(vec![None, None, None])
            .land_grid_whitelists(vec![None, None, None])
            .water_grid([Point::new(2, 0)])
    }

    #[test]
    fn test_valid_board_passes() {
        let board = base()
            .land_neighbors(vec![Some(vec![1, 2]), Some(vec![0]), None])
            .water_neighbors(vec![Some(vec![1])])
            .water_water_neighbors(vec![Some(vec![])])
            .land_intersections(vec![Some(vec![0, 1, 2])])
            .land_intersection_indexes(vec![Some(vec![0]), Some(vec![0]), Some(vec![0])])
            .placement_blacklists(vec![vec![0, 2]])
            .harbor_lines(vec![Some(vec![0, 1]), Some(vec![3, 4, 5]), None])
            .build();
        assert!(board.is_ok(), "{:?}", board);
    }

    #[test]
    fn test_length_mismatch_names_field() {
        let err = base()
            .land_grid_resources(vec![Some(Resource::Wood)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                field: "land_grid_resources",
                expected: 3,
                found: 1,
            }
        );
        assert!(err.to_string().contains("land_grid_resources"));
    }

    #[test]
    fn test_land_neighbor_out_of_range() {
        let err = base()
            .land_neighbors(vec![Some(vec![1]), Some(vec![3])])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TileIndexOutOfRange {
                field: "land_neighbors",
                target: "land_grid",
                entry: 1,
                index: 3,
                bound: 3,
            }
        );
    }

    #[test]
    fn test_negative_index_rejected() {
        let err = base()
            .water_neighbors(vec![Some(vec![-1])])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TileIndexOutOfRange { field: "water_neighbors", index: -1, .. }
        ));
    }

    #[test]
    fn test_water_water_neighbors_checked_against_water_grid() {
        // Index 2 is a valid land tile but there is only one water tile
        let err = base()
            .water_water_neighbors(vec![Some(vec![2])])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TileIndexOutOfRange { target: "water_grid", bound: 1, .. }
        ));
    }

    #[test]
    fn test_intersection_indexes_checked_against_intersections() {
        let err = base()
            .land_intersections(vec![Some(vec![0, 1, 2])])
            .land_intersection_indexes(vec![Some(vec![1])])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TileIndexOutOfRange { target: "land_intersections", .. }
        ));
    }

    #[test]
    fn test_blacklist_out_of_range() {
        let err = base()
            .placement_blacklists(vec![vec![0], vec![7]])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TileIndexOutOfRange { field: "placement_blacklists", entry: 1, index: 7, .. }
        ));
    }

    #[test]
    fn test_unknown_whitelist_key() {
        let err = base()
            .land_grid_whitelists(vec![None, Some("B".to_string()), None])
            .land_resource_whitelists([("A".to_string(), vec![Resource::Wood])])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownWhitelistKey {
                tile: 1,
                key: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_probability_whitelist_key_is_enough() {
        let board = base()
            .land_grid_whitelists(vec![Some("P".to_string()), None, None])
            .land_probability_whitelists([("P".to_string(), vec![6, 8])])
            .build();
        assert!(board.is_ok());
    }

    #[test]
    fn test_harbor_lines_geometry() {
        for bad in [vec![0], vec![0, 1, 2, 3], vec![0, 6], vec![2, 2]] {
            let err = base()
                .harbor_lines(vec![Some(bad.clone())])
                .build()
                .unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidHarborLine {
                    entry: 0,
                    corners: bad,
                }
            );
        }
    }
}
