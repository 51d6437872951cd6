//! Data transfer objects for web requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::availability::TrainAvailability;
use crate::domain::{FareMatrix, SeatClass};
use crate::matrix::{MatrixResult, MatrixSummary, RouteSearch};
use crate::store::MatrixId;

/// Request to build a seat matrix.
#[derive(Debug, Deserialize)]
pub struct MatrixRequest {
    /// Train model or display name, e.g. `"701"` or `"SUBORNA EXPRESS (701)"`
    pub train: String,

    /// Journey date, `15-Oct-2026` or `2026-10-15`
    pub date: String,
}

/// A built matrix.
#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    /// Handle for route queries against this matrix
    pub id: MatrixId,

    #[serde(flatten)]
    pub summary: MatrixSummary,

    /// Cells of every available class
    pub classes: Vec<ClassCells>,
}

/// The non-empty cells of one class.
#[derive(Debug, Serialize)]
pub struct ClassCells {
    pub seat_class: SeatClass,
    pub cells: Vec<CellResult>,
}

/// One origin/destination cell.
#[derive(Debug, Serialize)]
pub struct CellResult {
    pub from: String,
    pub to: String,
    pub online: u32,
    pub offline: u32,
    pub fare: u32,
    pub vat: u32,
}

impl MatrixResponse {
    pub fn new(id: MatrixId, result: &MatrixResult) -> Self {
        let classes = result
            .available_classes
            .iter()
            .map(|class| ClassCells {
                seat_class: *class,
                cells: cells_with_seats(&result.matrix, *class),
            })
            .collect();
        Self {
            id,
            summary: result.summary(),
            classes,
        }
    }
}

fn cells_with_seats(matrix: &FareMatrix, class: SeatClass) -> Vec<CellResult> {
    matrix
        .pairs()
        .filter_map(|(from, to)| {
            let cell = matrix.cell(class, from, to).filter(|c| c.has_seats())?;
            Some(CellResult {
                from: matrix.station(from)?.to_string(),
                to: matrix.station(to)?.to_string(),
                online: cell.online,
                offline: cell.offline,
                fare: cell.fare,
                vat: cell.vat,
            })
        })
        .collect()
}

/// Query for routes over a built matrix.
#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub origin: String,
    pub destination: String,
    #[serde(flatten)]
    pub search: RouteSearch,
}

/// Query for point-to-point availability.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub origin: String,
    pub destination: String,
    pub date: String,

    /// Seat class code (defaults to `S_CHAIR`)
    pub class: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub trains: BTreeMap<String, TrainAvailability>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// The client should send the user to credential entry
    pub auth_required: bool,
}
