//! List/detail selection over a candidate collection. Selection is an index
//! into the current collection, so it can never point at a candidate from a
//! previous one.

use shared::domain::{CollectionId, Disposition, PlanetCandidate};
use tracing::{debug, info};

use crate::{
    animation::OrbitAnimation,
    geometry::{compute_geometry, TransitGeometry, TransitInputs},
};

pub const DETAIL_PLACEHOLDER: &str = "Select a candidate from the list to view details.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateEntry<'a> {
    pub index: usize,
    pub name: &'a str,
    pub disposition: Disposition,
    pub score: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDetail<'a> {
    pub candidate: &'a PlanetCandidate,
    pub inputs: TransitInputs,
    pub geometry: TransitGeometry,
}

impl CandidateDetail<'_> {
    pub fn status_text(&self) -> &'static str {
        self.candidate.disposition.as_str()
    }

    pub fn score_text(&self) -> String {
        self.candidate.score.to_string()
    }

    pub fn period_text(&self) -> String {
        format!("{:.2} days", self.candidate.orbital_period_days)
    }

    pub fn radius_text(&self) -> String {
        format!("{} (x Earth)", self.candidate.planet_radius_earth_radii)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView<'a> {
    Placeholder,
    Candidate(CandidateDetail<'a>),
}

#[derive(Debug, Default)]
pub struct CandidateSelector {
    collection_id: CollectionId,
    candidates: Vec<PlanetCandidate>,
    selected: Option<usize>,
    animation: Option<OrbitAnimation>,
}

impl CandidateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection. Selection moves to the first candidate, or is
    /// unset for an empty collection; the previous animation stops.
    pub fn load(&mut self, candidates: Vec<PlanetCandidate>) {
        self.unmount();
        self.collection_id = self.collection_id.next();
        self.candidates = candidates;
        self.selected = if self.candidates.is_empty() { None } else { Some(0) };
        info!(
            collection = self.collection_id.0,
            candidates = self.candidates.len(),
            "dashboard: collection loaded"
        );
        self.mount();
    }

    pub fn collection_id(&self) -> CollectionId {
        self.collection_id
    }

    pub fn candidates(&self) -> &[PlanetCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&PlanetCandidate> {
        self.selected.and_then(|i| self.candidates.get(i))
    }

    /// Returns `false` and leaves the selection alone for an out-of-range
    /// index. Reselecting the current entry keeps its animation running.
    pub fn select_index(&mut self, index: usize) -> bool {
        if index >= self.candidates.len() {
            return false;
        }
        if self.selected == Some(index) {
            return true;
        }
        self.unmount();
        self.selected = Some(index);
        debug!(index, name = %self.candidates[index].name, "dashboard: selected");
        self.mount();
        true
    }

    pub fn select_name(&mut self, name: &str) -> bool {
        match self.candidates.iter().position(|c| c.name == name) {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = CandidateEntry<'_>> + '_ {
        self.candidates
            .iter()
            .enumerate()
            .map(move |(index, candidate)| CandidateEntry {
                index,
                name: &candidate.name,
                disposition: candidate.disposition,
                score: candidate.score,
                selected: self.selected == Some(index),
            })
    }

    /// Pure function of the current selection.
    pub fn detail(&self) -> DetailView<'_> {
        match self.selected() {
            None => DetailView::Placeholder,
            Some(candidate) => {
                let inputs = TransitInputs::from(candidate);
                DetailView::Candidate(CandidateDetail {
                    candidate,
                    inputs,
                    geometry: compute_geometry(inputs),
                })
            }
        }
    }

    pub fn animation(&self) -> Option<&OrbitAnimation> {
        self.animation.as_ref()
    }

    /// Starts the selected candidate's animation if none is running, e.g.
    /// when the detail pane becomes visible again.
    pub fn mount(&mut self) {
        if self.animation.is_some() {
            return;
        }
        let animation = match self.detail() {
            DetailView::Candidate(detail) => Some(OrbitAnimation::start(
                detail.candidate.name.clone(),
                &detail.geometry,
            )),
            DetailView::Placeholder => None,
        };
        self.animation = animation;
    }

    /// Stops and releases the running animation, if any.
    pub fn unmount(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.stop();
        }
    }
}
