use crate::error::ConfigurationError;
use crate::problem::{LegIndex, SiteIndex, StageIndex};

/// The role of a stage in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// A production site. Its input inventory is turned into output by the site's production.
    Factory(SiteIndex),
    Warehouse,
    /// The stage facing external demand
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    /// The producing site's output moves on without a shipment decision
    Direct,
    /// A capacitated shipment with its own quantity and setup flag
    Shipment,
}

/// The connection between stage `from` and stage `from + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub from: StageIndex,
    pub to: StageIndex,
    pub kind: LegKind,
    /// Transit delay in base periods
    pub base_lead: usize,
    /// Transit delay in sub-periods
    pub lead: usize,
    /// Shipments on this leg are priced by the freight tariff
    pub freight: bool,
    /// Material in transit on this leg pays holding cost
    pub in_transit_holding: bool,
}

/// A linear chain of stages taken from a fixed catalog of supported shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    stages: Vec<StageKind>,
    legs: Vec<Leg>,
    aggregation: usize,
}

impl Topology {
    /// The catalog entry for a chain of `stages` stages with `aggregation` sub-periods per base period
    pub fn new(stages: usize, aggregation: usize) -> Result<Topology, ConfigurationError> {
        use LegKind::*;
        use StageKind::*;

        if aggregation == 0 {
            return Err(ConfigurationError::ZeroAggregation);
        }

        // (kind, base lead, freight, in-transit holding) per leg
        let (kinds, legs): (Vec<StageKind>, Vec<(LegKind, usize, bool, bool)>) = match stages {
            3 => (
                vec![Factory(0), Warehouse, Market],
                vec![(Direct, 0, false, false), (Shipment, 1, true, true)],
            ),
            4 => (
                vec![Factory(0), Warehouse, Warehouse, Market],
                vec![
                    (Direct, 0, false, false),
                    (Shipment, 1, false, true),
                    (Shipment, 0, true, false),
                ],
            ),
            5 => (
                vec![Factory(0), Warehouse, Factory(1), Warehouse, Market],
                vec![
                    (Direct, 0, false, false),
                    (Shipment, 1, true, true),
                    (Shipment, 0, false, false),
                    (Shipment, 0, true, false),
                ],
            ),
            k => return Err(ConfigurationError::UnsupportedStageCount(k)),
        };

        let legs = legs
            .into_iter()
            .enumerate()
            .map(|(l, (kind, base_lead, freight, in_transit_holding))| Leg {
                from: l,
                to: l + 1,
                kind,
                base_lead,
                lead: base_lead * aggregation,
                freight,
                in_transit_holding,
            })
            .collect();

        Ok(Topology {
            stages: kinds,
            legs,
            aggregation,
        })
    }

    /// The stages in chain order
    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn aggregation(&self) -> usize {
        self.aggregation
    }

    /// The legs in chain order. Leg `l` goes from stage `l` to stage `l + 1`.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn last_stage(&self) -> StageIndex {
        self.stages.len() - 1
    }

    /// The leg arriving at stage `k`, if any
    pub fn inbound(&self, k: StageIndex) -> Option<&Leg> {
        k.checked_sub(1).and_then(|l| self.legs.get(l))
    }

    /// The leg leaving stage `k`, if any
    pub fn outbound(&self, k: StageIndex) -> Option<&Leg> {
        self.legs.get(k)
    }

    /// Number of production sites
    pub fn sites(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| matches!(s, StageKind::Factory(_)))
            .count()
    }

    /// The stage hosting production site `s`
    pub fn site_stage(&self, s: SiteIndex) -> Option<StageIndex> {
        self.stages
            .iter()
            .position(|kind| *kind == StageKind::Factory(s))
    }

    /// The production site located at stage `k`, if any
    pub fn site_at(&self, k: StageIndex) -> Option<SiteIndex> {
        match self.stages.get(k) {
            Some(StageKind::Factory(s)) => Some(*s),
            _ => None,
        }
    }

    /// Legs carrying a shipment variable
    pub fn shipment_legs(&self) -> impl Iterator<Item = LegIndex> + '_ {
        self.legs
            .iter()
            .filter(|leg| leg.kind == LegKind::Shipment)
            .map(|leg| leg.from)
    }

    /// Legs priced by the freight tariff
    pub fn freight_legs(&self) -> impl Iterator<Item = LegIndex> + '_ {
        self.legs.iter().filter(|leg| leg.freight).map(|leg| leg.from)
    }

    /// Legs charging holding cost for material in transit
    pub fn in_transit_legs(&self) -> impl Iterator<Item = LegIndex> + '_ {
        self.legs
            .iter()
            .filter(|leg| leg.in_transit_holding)
            .map(|leg| leg.from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shapes() {
        for (k, sites, freight, transit) in [
            (3, 1, vec![1], vec![1]),
            (4, 1, vec![2], vec![1]),
            (5, 2, vec![1, 3], vec![1]),
        ] {
            let topology = Topology::new(k, 1).unwrap();
            assert_eq!(topology.len(), k);
            assert_eq!(topology.legs().len(), k - 1);
            assert_eq!(topology.sites(), sites);
            assert_eq!(topology.freight_legs().collect::<Vec<_>>(), freight);
            assert_eq!(topology.in_transit_legs().collect::<Vec<_>>(), transit);
            assert_eq!(topology.stages()[0], StageKind::Factory(0));
            assert_eq!(topology.stages()[k - 1], StageKind::Market);
            assert_eq!(topology.inbound(0), None);
            assert_eq!(topology.outbound(k - 1), None);
        }
    }

    #[test]
    fn every_inner_stage_has_one_inbound_and_one_outbound_leg() {
        for k in 3..=5 {
            let topology = Topology::new(k, 2).unwrap();
            for stage in 1..topology.last_stage() {
                assert_eq!(topology.inbound(stage).map(|l| l.to), Some(stage));
                assert_eq!(topology.outbound(stage).map(|l| l.from), Some(stage));
            }
        }
    }

    #[test]
    fn lead_times_scale_with_aggregation() {
        let topology = Topology::new(4, 3).unwrap();
        let leads = topology.legs().iter().map(|l| l.lead).collect::<Vec<_>>();
        assert_eq!(leads, vec![0, 3, 0]);
    }

    #[test]
    fn second_site_sits_in_the_middle() {
        let topology = Topology::new(5, 1).unwrap();
        assert_eq!(topology.site_stage(1), Some(2));
        assert_eq!(topology.site_at(2), Some(1));
        assert_eq!(topology.site_at(1), None);
        assert_eq!(topology.outbound(2).map(|l| l.kind), Some(LegKind::Shipment));
    }

    #[test]
    fn unsupported_sizes_fail() {
        for k in [0, 1, 2, 6, 10] {
            assert_eq!(
                Topology::new(k, 1),
                Err(ConfigurationError::UnsupportedStageCount(k))
            );
        }
        assert_eq!(Topology::new(3, 0), Err(ConfigurationError::ZeroAggregation));
    }
}
