//! Benchmark scenarios: the `version 1.0` text format and a seeded
//! random generator.
//!
//! ```text
//! version 1.0
//! bucket map xsize ysize start_x start_y goal_x goal_y gridcost
//! ...
//! ```

use std::io::Read;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::geometry::Point;
use crate::mesh::{Mesh, PointLocation};

/// One start/goal query with the reference grid cost it was generated with.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub bucket: i64,
    pub map: String,
    pub xsize: i64,
    pub ysize: i64,
    pub start: Point,
    pub goal: Point,
    pub gridcost: f64,
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenarios: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't find scenario version")]
    MissingVersion,

    #[error("invalid scenario version '{0}' (expecting 'version 1.0')")]
    Version(String),

    #[error("scenario {index}: could not parse {what} from '{token}'")]
    Parse {
        index: usize,
        what: &'static str,
        token: String,
    },

    #[error("scenario {index}: row has {fields} of 9 fields")]
    Truncated { index: usize, fields: usize },
}

const FIELDS: usize = 9;

/// Reads every scenario from `reader`.
///
/// The header must be `version 1.0`; after it the input is a flat sequence
/// of 9-field rows. A row that is cut short or has an unparsable field is an
/// error.
pub fn load_scenarios<R: Read>(mut reader: R) -> ScenarioResult<Vec<Scenario>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    let (Some(tag), Some(version)) = (tokens.next(), tokens.next()) else {
        return Err(ScenarioError::MissingVersion);
    };
    if tag != "version" || version.parse::<f64>().ok() != Some(1.0) {
        return Err(ScenarioError::Version(format!("{tag} {version}")));
    }

    let tokens: Vec<&str> = tokens.collect();
    tokens
        .chunks(FIELDS)
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn parse_row(index: usize, row: &[&str]) -> ScenarioResult<Scenario> {
    if row.len() < FIELDS {
        return Err(ScenarioError::Truncated {
            index,
            fields: row.len(),
        });
    }
    fn field<T: FromStr>(index: usize, what: &'static str, token: &str) -> ScenarioResult<T> {
        token.parse().map_err(|_| ScenarioError::Parse {
            index,
            what,
            token: token.to_string(),
        })
    }
    Ok(Scenario {
        bucket: field(index, "bucket", row[0])?,
        map: row[1].to_string(),
        xsize: field(index, "xsize", row[2])?,
        ysize: field(index, "ysize", row[3])?,
        start: Point::new(
            field(index, "start x", row[4])?,
            field(index, "start y", row[5])?,
        ),
        goal: Point::new(
            field(index, "goal x", row[6])?,
            field(index, "goal y", row[7])?,
        ),
        gridcost: field(index, "gridcost", row[8])?,
    })
}

/// Draws on-mesh points uniformly from the mesh bounds, rejecting points in
/// holes.
struct PointSampler<'m> {
    mesh: &'m Mesh,
    rng: StdRng,
}

impl PointSampler<'_> {
    const MAX_TRIES: usize = 10_000;

    fn sample(&mut self) -> Option<Point> {
        let b = *self.mesh.bounds();
        (0..Self::MAX_TRIES).find_map(|_| {
            let p = Point::new(
                self.rng.gen_range(b.min_x..=b.max_x),
                self.rng.gen_range(b.min_y..=b.max_y),
            );
            (self.mesh.get_point_location(&p) != PointLocation::NotOnMesh).then_some(p)
        })
    }
}

/// `count` reproducible scenarios with both ends on the mesh.
///
/// Stops early if the mesh covers so little of its bounding box that
/// sampling keeps missing it. `gridcost` is `-1` (no reference cost).
pub fn random_scenarios(mesh: &Mesh, count: usize, seed: u64) -> Vec<Scenario> {
    let mut sampler = PointSampler {
        mesh,
        rng: StdRng::seed_from_u64(seed),
    };
    let b = mesh.bounds();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let (Some(start), Some(goal)) = (sampler.sample(), sampler.sample()) else {
            tracing::warn!(generated = out.len(), count, "could not sample points on the mesh");
            break;
        };
        out.push(Scenario {
            bucket: 0,
            map: "random".to_string(),
            xsize: (b.max_x - b.min_x).ceil() as i64,
            ysize: (b.max_y - b.min_y).ceil() as i64,
            start,
            goal,
            gridcost: -1.0,
        });
    }
    out
}
