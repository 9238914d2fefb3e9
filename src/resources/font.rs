//! three.js typeface fonts.
//!
//! A typeface file is JSON with a `glyphs` table keyed by character. Each glyph
//! carries its horizontal advance `ha` and an outline string `o` made of the
//! commands `m x y`, `l x y`, `q x y cx cy`, `b x y c1x c1y c2x c2y` and `z`.
//! Curve commands list the end point first and the control points after it.

use std::collections::HashMap;
use std::str::SplitWhitespace;

use anyhow::{Context, bail};
use lyon::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon::math::{Point, point};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TypefaceJson {
    glyphs: HashMap<String, GlyphJson>,
    #[serde(rename = "familyName", default)]
    family_name: String,
    resolution: f32,
    #[serde(rename = "boundingBox")]
    bounding_box: BoundsJson,
    #[serde(rename = "underlineThickness", default)]
    underline_thickness: f32,
}

#[derive(Debug, Deserialize)]
struct GlyphJson {
    ha: f32,
    #[serde(default)]
    o: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoundsJson {
    #[serde(rename = "yMin")]
    y_min: f32,
    #[serde(rename = "yMax")]
    y_max: f32,
}

/// One outline command in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    pub commands: Vec<PathCommand>,
}

/// The flattened outline of one laid out character.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOutline {
    pub character: char,
    /// Closed polygons without a repeated end point. Outer contours and holes
    /// are mixed; their orientation is whatever the font uses.
    pub contours: Vec<Vec<Point>>,
}

#[derive(Clone, Debug)]
pub struct Font {
    family_name: String,
    resolution: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: TypefaceJson =
            serde_json::from_str(json).context("font is not a typeface json document")?;
        if raw.resolution <= 0.0 {
            bail!("font resolution must be positive, got {}", raw.resolution);
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(character), None) = (chars.next(), chars.next()) else {
                log::debug!("skipping glyph key {key:?}, not a single character");
                continue;
            };
            let commands = match &glyph.o {
                Some(outline) => parse_outline(outline)
                    .with_context(|| format!("invalid outline for glyph {character:?}"))?,
                None => Vec::new(),
            };
            glyphs.insert(
                character,
                Glyph {
                    advance: glyph.ha,
                    commands,
                },
            );
        }

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            line_height: raw.bounding_box.y_max - raw.bounding_box.y_min
                + raw.underline_thickness,
            glyphs,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.get(&character)
    }

    /// Distance between two baselines for text of the given size.
    pub fn line_height(&self, size: f32) -> f32 {
        self.line_height * size / self.resolution
    }

    /// Lays `text` out left to right starting at the origin and flattens every
    /// glyph outline. Curves are split into `curve_segments` straight pieces.
    ///
    /// A `'\n'` starts a new line below the current one. Characters missing
    /// from the font are drawn as `'?'`, or skipped if that is missing too.
    pub fn outline_text(&self, text: &str, size: f32, curve_segments: u32) -> Vec<GlyphOutline> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let segments = curve_segments.max(1);
        let mut offset = point(0.0, 0.0);
        let mut outlines = Vec::new();

        for character in text.chars() {
            if character == '\n' {
                offset = point(0.0, offset.y - line_height);
                continue;
            }
            let Some(glyph) = self.glyph(character).or_else(|| self.glyph('?')) else {
                log::warn!(
                    "character {character:?} does not exist in font family {}",
                    self.family_name
                );
                continue;
            };
            let place = |p: Point| point(p.x * scale + offset.x, p.y * scale + offset.y);
            outlines.push(GlyphOutline {
                character,
                contours: flatten(&glyph.commands, segments, place),
            });
            offset.x += glyph.advance * scale;
        }

        outlines
    }
}

fn parse_outline(outline: &str) -> anyhow::Result<Vec<PathCommand>> {
    let mut tokens = outline.split_whitespace();
    let mut commands = Vec::new();
    while let Some(action) = tokens.next() {
        let command = match action {
            "m" => PathCommand::MoveTo(next_point(&mut tokens)?),
            "l" => PathCommand::LineTo(next_point(&mut tokens)?),
            "q" => {
                let to = next_point(&mut tokens)?;
                let ctrl = next_point(&mut tokens)?;
                PathCommand::QuadTo { ctrl, to }
            }
            "b" => {
                let to = next_point(&mut tokens)?;
                let ctrl1 = next_point(&mut tokens)?;
                let ctrl2 = next_point(&mut tokens)?;
                PathCommand::CubicTo { ctrl1, ctrl2, to }
            }
            "z" => PathCommand::Close,
            other => bail!("unknown outline command {other:?}"),
        };
        commands.push(command);
    }
    Ok(commands)
}

fn next_point(tokens: &mut SplitWhitespace<'_>) -> anyhow::Result<Point> {
    let mut coordinate = || -> anyhow::Result<f32> {
        let token = tokens.next().context("outline ends in the middle of a command")?;
        token
            .parse::<f32>()
            .with_context(|| format!("{token:?} is not a number"))
    };
    let x = coordinate()?;
    let y = coordinate()?;
    Ok(point(x, y))
}

fn flatten(
    commands: &[PathCommand],
    segments: u32,
    place: impl Fn(Point) -> Point,
) -> Vec<Vec<Point>> {
    let mut contours = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut pen = point(0.0, 0.0);

    for command in commands {
        match *command {
            PathCommand::MoveTo(to) => {
                finish_contour(&mut current, &mut contours);
                current.push(place(to));
                pen = to;
            }
            PathCommand::LineTo(to) => {
                current.push(place(to));
                pen = to;
            }
            PathCommand::QuadTo { ctrl, to } => {
                let curve = QuadraticBezierSegment { from: pen, ctrl, to };
                current.extend((1..=segments).map(|s| place(curve.sample(s as f32 / segments as f32))));
                pen = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let curve = CubicBezierSegment {
                    from: pen,
                    ctrl1,
                    ctrl2,
                    to,
                };
                current.extend((1..=segments).map(|s| place(curve.sample(s as f32 / segments as f32))));
                pen = to;
            }
            PathCommand::Close => finish_contour(&mut current, &mut contours),
        }
    }
    finish_contour(&mut current, &mut contours);
    contours
}

fn finish_contour(current: &mut Vec<Point>, contours: &mut Vec<Vec<Point>>) {
    let mut contour = std::mem::take(current);
    contour.dedup();
    while contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}
