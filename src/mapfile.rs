//! Map file format.
//!
//! A map is fixed-layout text, one field per line:
//!
//! ```text
//! MAPFILE
//! <name>
//! <width> x <height>
//! zlayer=<int>
//! palette:
//! <index>\t<asset>::<sequence>      (zero or more)
//! }
//! <v>\t<v>\t...\t<v>                (height rows of width values)
//! ```
//!
//! Every literal and separator is exact: single spaces around the `x`, tabs
//! between values, no trailing whitespace and no blank lines after the last
//! row. Each tile value must be a palette index. The final newline is
//! optional.
//!
//! [`MapFile::parse`] checks the layout only. Palette entries are resolved
//! against the asset catalog by
//! [`TileGrid::from_map`](crate::resources::tilegrid::TileGrid::from_map).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::MapError;

pub const MAGIC: &str = "MAPFILE";
const PALETTE_START: &str = "palette:";
const PALETTE_END: &str = "}";
const ZLAYER_PREFIX: &str = "zlayer=";
const DIM_SEPARATOR: &str = " x ";
/// Lines before the first palette entry.
const HEADER_LINES: usize = 5;

/// The animation a palette index stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub asset: String,
    pub sequence: String,
}

/// A parsed map file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapFile {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub z_layer: i32,
    pub palette: BTreeMap<u32, PaletteEntry>,
    /// `cells[row][col]`, each a palette index.
    pub cells: Vec<Vec<u32>>,
}

struct Lines<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text.split('\n').collect();
        // A final newline terminates the last line rather than opening a new one.
        if lines.last() == Some(&"") {
            lines.pop();
        }
        Self { lines, next: 0 }
    }

    /// Next line and its 1-based number.
    fn take(&mut self, what: &str) -> Result<(usize, &'a str), MapError> {
        let number = self.next + 1;
        let line = self
            .lines
            .get(self.next)
            .copied()
            .ok_or_else(|| MapError::format(number, format!("expected {what}, found end of file")))?;
        self.next += 1;
        Ok((number, line))
    }

    fn take_literal(&mut self, literal: &str) -> Result<(), MapError> {
        let (number, line) = self.take(&format!("'{literal}'"))?;
        if line != literal {
            return Err(MapError::format(
                number,
                format!("expected '{literal}', found '{line}'"),
            ));
        }
        Ok(())
    }

    fn remaining(&self) -> Option<usize> {
        (self.next < self.lines.len()).then_some(self.next + 1)
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_number<T: std::str::FromStr>(field: &str, line: usize, what: &str) -> Result<T, MapError> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(MapError::format(line, format!("invalid {what} '{field}'")));
    }
    field
        .parse()
        .map_err(|_| MapError::format(line, format!("{what} '{field}' is out of range")))
}

impl MapFile {
    /// Read and parse a map file from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut lines = Lines::new(text);

        lines.take_literal(MAGIC)?;

        let (number, name) = lines.take("map name")?;
        if name.is_empty() {
            return Err(MapError::format(number, "map name is empty"));
        }

        let (number, dims) = lines.take("map dimensions")?;
        let (w, h) = dims.split_once(DIM_SEPARATOR).ok_or_else(|| {
            MapError::format(number, format!("expected '<width> x <height>', found '{dims}'"))
        })?;
        let width: usize = parse_number(w, number, "width")?;
        let height: usize = parse_number(h, number, "height")?;
        if width == 0 || height == 0 {
            return Err(MapError::format(number, "map dimensions must be positive"));
        }

        let (number, zline) = lines.take("z-layer")?;
        let z_layer = zline
            .strip_prefix(ZLAYER_PREFIX)
            .and_then(|z| z.parse::<i32>().ok())
            .ok_or_else(|| {
                MapError::format(number, format!("expected 'zlayer=<int>', found '{zline}'"))
            })?;

        lines.take_literal(PALETTE_START)?;

        let mut palette = BTreeMap::new();
        loop {
            let (number, line) = lines.take("palette entry or '}'")?;
            if line == PALETTE_END {
                break;
            }
            let (index, target) = line.split_once('\t').ok_or_else(|| {
                MapError::format(number, format!("invalid palette entry '{line}'"))
            })?;
            let index: u32 = parse_number(index, number, "palette index")?;
            let (asset, sequence) = target
                .split_once("::")
                .filter(|(a, s)| is_name(a) && is_name(s))
                .ok_or_else(|| {
                    MapError::format(
                        number,
                        format!("expected '<asset>::<sequence>', found '{target}'"),
                    )
                })?;
            let entry = PaletteEntry {
                asset: asset.to_string(),
                sequence: sequence.to_string(),
            };
            if palette.insert(index, entry).is_some() {
                return Err(MapError::format(
                    number,
                    format!("palette index {index} is defined twice"),
                ));
            }
        }

        let mut cells = Vec::with_capacity(height);
        for row in 0..height {
            let (number, line) = lines.take(&format!("row {row}"))?;
            let values = line
                .split('\t')
                .map(|field| {
                    let value: u32 = parse_number(field, number, "tile value")?;
                    if !palette.contains_key(&value) {
                        return Err(MapError::UnknownPaletteIndex {
                            line: number,
                            value,
                        });
                    }
                    Ok(value)
                })
                .collect::<Result<Vec<u32>, MapError>>()?;
            if values.len() != width {
                return Err(MapError::format(
                    number,
                    format!("row {row} has {} tiles, expected {width}", values.len()),
                ));
            }
            cells.push(values);
        }

        if let Some(number) = lines.remaining() {
            return Err(MapError::format(number, "unexpected content after last row"));
        }

        Ok(Self {
            name: name.to_string(),
            width,
            height,
            z_layer,
            palette,
            cells,
        })
    }

    /// Palette index at a grid position.
    pub fn cell(&self, col: usize, row: usize) -> Option<u32> {
        self.cells.get(row)?.get(col).copied()
    }

    /// 1-based line number of a tile row in the serialized file.
    pub fn row_line(&self, row: usize) -> usize {
        HEADER_LINES + self.palette.len() + 2 + row
    }
}

impl fmt::Display for MapFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{MAGIC}")?;
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}{DIM_SEPARATOR}{}", self.width, self.height)?;
        writeln!(f, "{ZLAYER_PREFIX}{}", self.z_layer)?;
        writeln!(f, "{PALETTE_START}")?;
        for (index, entry) in &self.palette {
            writeln!(f, "{index}\t{}::{}", entry.asset, entry.sequence)?;
        }
        writeln!(f, "{PALETTE_END}")?;
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(u32::to_string).collect();
            writeln!(f, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "MAPFILE\ntest map\n3 x 2\nzlayer=-2\npalette:\n0\tgrass::idle\n3\tapc::idle\n}\n0\t0\t3\n3\t0\t0\n";

    #[test]
    fn parses_header_palette_and_rows() {
        let map = MapFile::parse(SMALL).unwrap();
        assert_eq!(map.name, "test map");
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!(map.z_layer, -2);
        assert_eq!(
            map.palette[&3],
            PaletteEntry {
                asset: "apc".into(),
                sequence: "idle".into()
            }
        );
        assert_eq!(map.cells, vec![vec![0, 0, 3], vec![3, 0, 0]]);
        assert_eq!(map.cell(2, 0), Some(3));
        assert_eq!(map.cell(3, 0), None);
    }

    #[test]
    fn dimensions_drive_grid_shape() {
        let row = vec!["1"; 10].join("\t");
        let rows = vec![row; 5].join("\n");
        let text = format!("MAPFILE\nbig\n10 x 5\nzlayer=0\npalette:\n1\ta::b\n}}\n{rows}\n");
        let map = MapFile::parse(&text).unwrap();
        assert_eq!(map.cells.len(), 5);
        assert!(map.cells.iter().all(|r| r.len() == 10));
    }

    #[test]
    fn final_newline_is_optional() {
        let trimmed = SMALL.trim_end_matches('\n');
        assert_eq!(MapFile::parse(trimmed).unwrap(), MapFile::parse(SMALL).unwrap());
    }

    #[test]
    fn trailing_blank_line_is_rejected() {
        let err = MapFile::parse(&format!("{SMALL}\n")).unwrap_err();
        assert!(matches!(err, MapError::Format { line: 11, .. }), "{err}");
    }

    #[test]
    fn bad_magic_is_rejected() {
        let err = MapFile::parse(&SMALL.replacen("MAPFILE", "MAPFILX", 1)).unwrap_err();
        assert!(matches!(err, MapError::Format { line: 1, .. }));
    }

    #[test]
    fn malformed_header_fields_are_rejected() {
        for (from, to, line) in [
            ("3 x 2", "3x2", 3),
            ("3 x 2", "3 x 0", 3),
            ("3 x 2", "-3 x 2", 3),
            ("zlayer=-2", "zlayer:-2", 4),
            ("zlayer=-2", "zlayer=", 4),
            ("palette:", "palette", 5),
        ] {
            let err = MapFile::parse(&SMALL.replacen(from, to, 1)).unwrap_err();
            match err {
                MapError::Format { line: l, .. } => assert_eq!(l, line, "{to}"),
                other => panic!("{to}: unexpected {other}"),
            }
        }
    }

    #[test]
    fn malformed_palette_entries_are_rejected() {
        for bad in ["0 grass::idle", "0\tgrass:idle", "x\tgrass::idle", "0\t::idle"] {
            let text = SMALL.replacen("0\tgrass::idle", bad, 1);
            assert!(
                matches!(MapFile::parse(&text), Err(MapError::Format { line: 6, .. })),
                "{bad}"
            );
        }
        let dup = SMALL.replacen("3\tapc::idle", "0\tapc::idle", 1);
        assert!(matches!(MapFile::parse(&dup), Err(MapError::Format { line: 7, .. })));
    }

    #[test]
    fn tile_outside_palette_is_rejected() {
        let text = SMALL.replacen("3\t0\t0", "3\t0\t7", 1);
        let err = MapFile::parse(&text).unwrap_err();
        assert!(matches!(err, MapError::UnknownPaletteIndex { line: 10, value: 7 }));
    }

    #[test]
    fn wrong_row_width_and_missing_rows_are_rejected() {
        let short = SMALL.replacen("0\t0\t3", "0\t0", 1);
        assert!(matches!(MapFile::parse(&short), Err(MapError::Format { line: 9, .. })));

        let missing = SMALL.replacen("3\t0\t0\n", "", 1);
        assert!(matches!(MapFile::parse(&missing), Err(MapError::Format { line: 10, .. })));

        let spaced = SMALL.replacen("0\t0\t3", "0 \t0\t3", 1);
        assert!(MapFile::parse(&spaced).is_err());
    }

    #[test]
    fn display_reproduces_the_file() {
        let map = MapFile::parse(SMALL).unwrap();
        assert_eq!(map.to_string(), SMALL);
        assert_eq!(map.row_line(1), 10);
    }
}
