//! Scatter-plot layout. Every position is a percentage of the plot area,
//! with y = 0 at the top.

use serde::Serialize;

use crate::taxonomy::{Taxonomy, DOMAIN_COUNT, STATES_PER_DOMAIN};

const Y_STEP: f64 = 100.0 / (DOMAIN_COUNT - 1) as f64;
const X_STEP: f64 = 100.0 / (STATES_PER_DOMAIN - 1) as f64;

/// Domain 1 sits at the bottom (100), domain 7 at the top (0).
/// Fractional domains are allowed and interpolate between rows.
pub fn map_y(domain_id: f64) -> f64 {
    100.0 - (domain_id - 1.0) * Y_STEP
}

/// State index 0 sits at the left edge (0), index 11 at the right (100).
pub fn map_x(state_index: usize) -> f64 {
    state_index as f64 * X_STEP
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub fn position(domain_id: u32, state_index: usize) -> Point {
    Point {
        x: map_x(state_index),
        y: map_y(domain_id as f64),
    }
}

/// Tooltip anchor for a state, derived from the ID alone.
pub fn state_position(state_id: u32) -> Option<Point> {
    if state_id == 0 || state_id as usize > DOMAIN_COUNT * STATES_PER_DOMAIN {
        return None;
    }
    let per = STATES_PER_DOMAIN as u32;
    let index = ((state_id - 1) % per) as usize;
    let domain = state_id.div_ceil(per);
    Some(position(domain, index))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotNode {
    pub state_id: u32,
    pub domain_id: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub domain_id: u32,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLine {
    pub domain_id: u32,
    pub label: String,
    pub color: String,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

/// The population density overlay, centered between the Action and
/// Cognition rows around the middle of the complexity axis.
pub fn density_overlay() -> Ellipse {
    Ellipse {
        cx: map_x(5),
        cy: map_y(4.5),
        rx: 30.0,
        ry: 15.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlotLayout {
    pub nodes: Vec<PlotNode>,
    pub connections: Vec<Segment>,
    pub rows: Vec<RowLine>,
    pub columns: Vec<f64>,
    pub density: Ellipse,
}

pub fn layout(taxonomy: &Taxonomy) -> PlotLayout {
    let mut nodes = Vec::new();
    let mut connections = Vec::new();
    let mut rows = Vec::with_capacity(taxonomy.domains().len());

    for domain in taxonomy.domains() {
        let y = map_y(domain.id as f64);
        rows.push(RowLine {
            domain_id: domain.id,
            label: domain.name.clone(),
            color: domain.color.clone(),
            y,
        });
        for (index, state) in domain.states.iter().enumerate() {
            nodes.push(PlotNode {
                state_id: state.id,
                domain_id: domain.id,
                x: map_x(index),
                y,
            });
            if index + 1 < domain.states.len() {
                connections.push(Segment {
                    domain_id: domain.id,
                    from: position(domain.id, index),
                    to: position(domain.id, index + 1),
                });
            }
        }
    }

    PlotLayout {
        nodes,
        connections,
        rows,
        columns: (0..STATES_PER_DOMAIN).map(map_x).collect(),
        density: density_overlay(),
    }
}
