//! Analysis kinds and how each one is visualized
//!
//! Every analysis tag the data API can return maps to exactly one view.
//! Matrix-shaped analyses get the heatmap; the rest are explicitly
//! not yet implemented rather than silently falling back to something else.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::matrix::{Matrix, MatrixLabels};

/// Errors raised while dispatching an analysis payload
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("unknown analysis '{0}'")]
    Unknown(String),
    #[error("{0} has no heatmap view")]
    NotAHeatmap(AnalysisKind),
    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: AnalysisKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Analyses published by the data API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Rmsd,
    DistPerresMean,
    DistPerresStdv,
    RmsdPairwiseInterface,
    DistPerres,
    Energies,
    Hbonds,
    RmsdPairwise,
    Fluctuation,
    TmScores,
    Rgyr,
    Rmsds,
    Pockets,
    Interactions,
    Pca,
    RmsdPerres,
    Sasa,
}

/// How an analysis is shown
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisView {
    /// Interactive matrix heatmap with these labels
    Heatmap(MatrixLabels),
    /// No visualization exists for this analysis yet
    NotYetImplemented,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 17] = [
        AnalysisKind::Rmsd,
        AnalysisKind::DistPerresMean,
        AnalysisKind::DistPerresStdv,
        AnalysisKind::RmsdPairwiseInterface,
        AnalysisKind::DistPerres,
        AnalysisKind::Energies,
        AnalysisKind::Hbonds,
        AnalysisKind::RmsdPairwise,
        AnalysisKind::Fluctuation,
        AnalysisKind::TmScores,
        AnalysisKind::Rgyr,
        AnalysisKind::Rmsds,
        AnalysisKind::Pockets,
        AnalysisKind::Interactions,
        AnalysisKind::Pca,
        AnalysisKind::RmsdPerres,
        AnalysisKind::Sasa,
    ];

    /// Tag used by the data API
    pub fn tag(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd => "rmsd",
            AnalysisKind::DistPerresMean => "dist-perres-mean",
            AnalysisKind::DistPerresStdv => "dist-perres-stdv",
            AnalysisKind::RmsdPairwiseInterface => "rmsd-pairwise-interface",
            AnalysisKind::DistPerres => "dist-perres",
            AnalysisKind::Energies => "energies",
            AnalysisKind::Hbonds => "hbonds",
            AnalysisKind::RmsdPairwise => "rmsd-pairwise",
            AnalysisKind::Fluctuation => "fluctuation",
            AnalysisKind::TmScores => "tmscores",
            AnalysisKind::Rgyr => "rgyr",
            AnalysisKind::Rmsds => "rmsds",
            AnalysisKind::Pockets => "pockets",
            AnalysisKind::Interactions => "interactions",
            AnalysisKind::Pca => "pca",
            AnalysisKind::RmsdPerres => "rmsd-perres",
            AnalysisKind::Sasa => "sasa",
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisKind::Rmsd => "RMSD",
            AnalysisKind::DistPerresMean => "Distance Per Residue (Mean)",
            AnalysisKind::DistPerresStdv => "Distance Per Residue (StdDev)",
            AnalysisKind::RmsdPairwiseInterface => "RMSD Pairwise Interface",
            AnalysisKind::DistPerres => "Distance Per Residue",
            AnalysisKind::Energies => "Energies",
            AnalysisKind::Hbonds => "Hydrogen Bonds",
            AnalysisKind::RmsdPairwise => "RMSD Pairwise",
            AnalysisKind::Fluctuation => "Fluctuation",
            AnalysisKind::TmScores => "TM Scores",
            AnalysisKind::Rgyr => "Radius of Gyration",
            AnalysisKind::Rmsds => "Multiple RMSDs",
            AnalysisKind::Pockets => "Pockets",
            AnalysisKind::Interactions => "Interactions",
            AnalysisKind::Pca => "Principal Component Analysis",
            AnalysisKind::RmsdPerres => "RMSD Per Residue",
            AnalysisKind::Sasa => "Solvent Accessible Surface Area",
        }
    }

    pub fn view(&self) -> AnalysisView {
        match self {
            AnalysisKind::DistPerresMean | AnalysisKind::DistPerresStdv => {
                AnalysisView::Heatmap(MatrixLabels::new("Residue", Some("Å")))
            }
            AnalysisKind::RmsdPairwiseInterface | AnalysisKind::RmsdPairwise => {
                AnalysisView::Heatmap(MatrixLabels::new("Frame", Some("Å")))
            }
            _ => AnalysisView::NotYetImplemented,
        }
    }

    /// Text shown in place of a missing visualization
    pub fn placeholder_text(&self) -> String {
        format!("Visualization for {} is not yet available.", self.display_name())
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AnalysisKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| AnalysisError::Unknown(s.to_string()))
    }
}

/// `{ "y": [[...]] }`
#[derive(Deserialize)]
struct YMatrixPayload {
    y: Matrix,
}

/// `{ "rmsds": [[...]], "start": .., "step": .. }`
#[derive(Deserialize)]
struct PairwisePayload {
    rmsds: Matrix,
}

/// Decode the matrix carried by a heatmap analysis payload
pub fn decode_matrix(kind: AnalysisKind, json: &str) -> Result<(Matrix, MatrixLabels), AnalysisError> {
    let AnalysisView::Heatmap(labels) = kind.view() else {
        return Err(AnalysisError::NotAHeatmap(kind));
    };

    let parsed = match kind {
        AnalysisKind::RmsdPairwise => serde_json::from_str::<PairwisePayload>(json).map(|p| p.rmsds),
        _ => serde_json::from_str::<YMatrixPayload>(json).map(|p| p.y),
    };

    let matrix = parsed.map_err(|source| AnalysisError::Payload { kind, source })?;
    Ok((matrix, labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in AnalysisKind::ALL {
            assert_eq!(kind.tag().parse::<AnalysisKind>().unwrap(), kind);
        }
        assert!(matches!("rmsd-2".parse::<AnalysisKind>(), Err(AnalysisError::Unknown(_))));
    }

    #[test]
    fn test_matrix_kinds_dispatch_to_heatmap() {
        let heatmaps: Vec<_> = AnalysisKind::ALL
            .into_iter()
            .filter(|k| matches!(k.view(), AnalysisView::Heatmap(_)))
            .collect();
        assert_eq!(
            heatmaps,
            vec![
                AnalysisKind::DistPerresMean,
                AnalysisKind::DistPerresStdv,
                AnalysisKind::RmsdPairwiseInterface,
                AnalysisKind::RmsdPairwise,
            ]
        );
        assert_eq!(AnalysisKind::Hbonds.view(), AnalysisView::NotYetImplemented);
    }

    #[test]
    fn test_decode_dist_perres_mean() {
        let json = r#"{ "y": [[0.0, 3.5], [3.5, null]] }"#;
        let (matrix, labels) = decode_matrix(AnalysisKind::DistPerresMean, json).unwrap();
        assert_eq!((matrix.rows(), matrix.cols()), (2, 2));
        assert_eq!(matrix.get(1, 1), None);
        assert_eq!(labels.axis, "Residue");
        assert_eq!(labels.unit.as_deref(), Some("Å"));
    }

    #[test]
    fn test_decode_pairwise_ignores_extra_fields() {
        let json = r#"{ "name": "x", "rmsds": [[0, 1], [1, 0]], "start": 0, "step": 10 }"#;
        let (matrix, labels) = decode_matrix(AnalysisKind::RmsdPairwise, json).unwrap();
        assert_eq!(matrix.get(0, 1), Some(1.0));
        assert_eq!(labels.axis, "Frame");
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_matrix(AnalysisKind::Rmsd, "{}"),
            Err(AnalysisError::NotAHeatmap(AnalysisKind::Rmsd))
        ));

        let err = decode_matrix(AnalysisKind::DistPerresStdv, r#"{ "y": [[1], [1, 2]] }"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Payload { .. }));
        assert!(err.to_string().contains("dist-perres-stdv"));
    }

    #[test]
    fn test_placeholder_text() {
        assert_eq!(
            AnalysisKind::Sasa.placeholder_text(),
            "Visualization for Solvent Accessible Surface Area is not yet available."
        );
    }
}
