//! Park service component

use crate::foundation::collections::ComponentId;
use crate::scene::StepContext;
use crate::schema::{Component, ComponentType, SchemaBuilder};

crate::schema_enum! {
    /// What a site offers
    #[derive(Default)]
    pub enum SiteType {
        #[default]
        Attraction = 0,
        Restaurant = 1,
        Entrance = 2,
    }
}

/// Running cost model of a park site
///
/// Each step adds the base cost, plus the service costs while visitors are
/// being served. Visitors in service are the initial visitors, capped by the
/// service capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkService {
    /// What the site offers
    pub site_type: SiteType,
    /// Visitors present when play starts
    pub initial_visitors: i32,
    /// Visitors served at once
    pub service_capacity: i32,
    /// Visitors allowed to queue
    pub waiting_capacity: i32,
    /// Cost per second while open
    pub base_cost: f32,
    /// Extra cost per second while serving anyone
    pub base_service_cost: f32,
    /// Extra cost per second per visitor served
    pub per_visitor_service_cost: f32,
    /// Sites visitors move on to
    pub neighbours: Vec<Option<ComponentId>>,
    total_cost: f32,
}

impl Default for ParkService {
    fn default() -> Self {
        Self {
            site_type: SiteType::default(),
            initial_visitors: 0,
            service_capacity: 0,
            waiting_capacity: 0,
            base_cost: 1.0,
            base_service_cost: 1.0,
            per_visitor_service_cost: 0.01,
            neighbours: Vec::new(),
            total_cost: 0.0,
        }
    }
}

impl ParkService {
    /// Site of `site_type` with default costs and no visitors
    pub fn new(site_type: SiteType) -> Self {
        Self {
            site_type,
            ..Self::default()
        }
    }

    /// Set the visitors present when play starts
    #[must_use]
    pub const fn with_visitors(mut self, initial_visitors: i32) -> Self {
        self.initial_visitors = initial_visitors;
        self
    }

    /// Set the service and waiting capacities
    #[must_use]
    pub const fn with_capacities(mut self, service: i32, waiting: i32) -> Self {
        self.service_capacity = service;
        self.waiting_capacity = waiting;
        self
    }

    /// Set the base, per-service and per-visitor costs
    #[must_use]
    pub const fn with_costs(mut self, base: f32, service: f32, per_visitor: f32) -> Self {
        self.base_cost = base;
        self.base_service_cost = service;
        self.per_visitor_service_cost = per_visitor;
        self
    }

    /// Set the sites visitors move on to
    #[must_use]
    pub fn with_neighbours(mut self, neighbours: Vec<Option<ComponentId>>) -> Self {
        self.neighbours = neighbours;
        self
    }

    /// Cost accumulated since play started
    pub const fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// Visitors currently in service
    pub fn serving(&self) -> i32 {
        self.initial_visitors.min(self.service_capacity).max(0)
    }
}

impl Component for ParkService {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn start(&mut self, _ctx: &mut StepContext<'_>) {
        self.total_cost = 0.0;
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) {
        let dt = ctx.delta_time;
        self.total_cost += self.base_cost * dt;
        let serving = self.serving();
        if serving > 0 {
            #[allow(clippy::cast_precision_loss)]
            let serving = serving as f32;
            self.total_cost += self.base_service_cost * dt;
            self.total_cost += self.per_visitor_service_cost * serving * dt;
        }
    }
}

impl ComponentType for ParkService {
    const TYPE_NAME: &'static str = "ParkService";

    fn schema(builder: SchemaBuilder<Self>) -> SchemaBuilder<Self> {
        builder
            .enumeration("Type", |s| s.site_type, |s, v| s.site_type = v)
            .field("InitialVisitors", |s| s.initial_visitors, |s, v| s.initial_visitors = v)
            .field("VisitorsServiceCapacity", |s| s.service_capacity, |s, v| s.service_capacity = v)
            .field("VisitorsWaitingCapacity", |s| s.waiting_capacity, |s, v| s.waiting_capacity = v)
            .field("BaseCost", |s| s.base_cost, |s, v| s.base_cost = v)
            .field("BaseServiceCost", |s| s.base_service_cost, |s, v| s.base_service_cost = v)
            .field("PerVisitorServiceCost", |s| s.per_visitor_service_cost, |s, v| s.per_visitor_service_cost = v)
            .component_ref_array("Neighbours", Self::TYPE_NAME, |s| &s.neighbours, |s| &mut s.neighbours)
            .read_only("TotalCost", |s| s.total_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(service: &mut ParkService, steps: usize, dt: f32) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = StepContext {
            delta_time: 0.0,
            elapsed: 0.0,
            step_count: 0,
            rng: &mut rng,
        };
        service.start(&mut ctx);
        ctx.delta_time = dt;
        for _ in 0..steps {
            service.step(&mut ctx);
        }
    }

    #[test]
    fn test_idle_site_pays_base_cost() {
        let mut service = ParkService::default();
        run(&mut service, 10, 0.5);
        assert_relative_eq!(service.total_cost(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_serving_adds_service_costs() {
        let mut service = ParkService {
            initial_visitors: 50,
            service_capacity: 20,
            ..Default::default()
        };
        assert_eq!(service.serving(), 20);
        run(&mut service, 4, 0.25);
        // 1.0 base + 1.0 service + 0.01 * 20 visitors, for one second
        assert_relative_eq!(service.total_cost(), 2.2, epsilon = 1e-5);
    }

    #[test]
    fn test_builder_sets_parameters() {
        let service = ParkService::new(SiteType::Restaurant)
            .with_visitors(12)
            .with_capacities(4, 30)
            .with_costs(2.0, 0.5, 0.1);

        assert_eq!(service.site_type, SiteType::Restaurant);
        assert_eq!(service.serving(), 4);
        assert_eq!(service.waiting_capacity, 30);
        assert_relative_eq!(service.base_cost, 2.0);
        assert_relative_eq!(service.total_cost(), 0.0);
    }
}
