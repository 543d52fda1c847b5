//! Behavioural tests for `OverpassRoadNetwork` against a canned local server.

use std::cell::RefCell;

use covend_core::{RoadGraph, RoadNetworkError, RoadNetworkService, Unlimited};
use covend_data::{OverpassConfig, OverpassRoadNetwork};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

mod support;

use support::{CannedServer, LIMA_CROSSING};

const CROSSING: Coord<f64> = Coord {
    x: -77.0298,
    y: -12.0432,
};

#[derive(Default)]
struct OverpassWorld {
    server: RefCell<Option<CannedServer>>,
    request: RefCell<Option<String>>,
    outcome: RefCell<Option<Result<RoadGraph, RoadNetworkError>>>,
}

impl OverpassWorld {
    fn serve(&self, status: u16, body: &str) {
        *self.server.borrow_mut() = Some(CannedServer::start(status, body));
    }

    fn expect_error(&self) -> RoadNetworkError {
        self.outcome
            .borrow()
            .as_ref()
            .expect("build should have run")
            .as_ref()
            .expect_err("build should fail")
            .clone()
    }
}

#[fixture]
fn world() -> OverpassWorld {
    OverpassWorld::default()
}

#[given("an Overpass server serving the Lima crossing")]
fn given_crossing(world: &OverpassWorld) {
    world.serve(200, LIMA_CROSSING);
}

#[given("an Overpass server answering with status {status:u32}")]
fn given_status(world: &OverpassWorld, status: u32) {
    world.serve(u16::try_from(status).unwrap_or(500), r#"{"elements": []}"#);
}

#[given("an Overpass server answering with no elements")]
fn given_no_elements(world: &OverpassWorld) {
    world.serve(200, r#"{"version": 0.6, "elements": []}"#);
}

#[given("an Overpass server reporting a runtime timeout")]
fn given_runtime_timeout(world: &OverpassWorld) {
    world.serve(
        200,
        r#"{"elements": [], "remark": "runtime error: Query timed out in \"query\" at line 1 after 60 seconds."}"#,
    );
}

#[when("I build the road network within {radius:u32} metres of the crossing")]
fn when_build(world: &OverpassWorld, radius: u32) {
    let server = world.server.borrow_mut().take().expect("server started");
    let service = OverpassRoadNetwork::with_config(OverpassConfig::new(server.base_url()))
        .expect("service should build");
    let outcome = service.build_graph(CROSSING, f64::from(radius), &Unlimited);
    *world.request.borrow_mut() = Some(server.finish());
    *world.outcome.borrow_mut() = Some(outcome);
}

#[then("the graph has {nodes:u32} nodes and {edges:u32} edges")]
fn then_graph_size(world: &OverpassWorld, nodes: u32, edges: u32) {
    let outcome = world.outcome.borrow();
    let graph = outcome
        .as_ref()
        .expect("build should have run")
        .as_ref()
        .expect("graph should build");
    assert_eq!(u32::try_from(graph.node_count()), Ok(nodes));
    assert_eq!(u32::try_from(graph.edge_count()), Ok(edges));
}

#[then("the request asked for highways within {radius:u32} metres")]
fn then_request_shape(world: &OverpassWorld, radius: u32) {
    let request = world.request.borrow().clone().expect("request recorded");
    assert!(request.starts_with("POST /api/interpreter "), "{request}");
    assert!(request.contains("highway"), "{request}");
    assert!(request.contains(&format!("around%3A{radius}%2C")), "{request}");
}

#[then("the road network is unavailable")]
fn then_unavailable(world: &OverpassWorld) {
    let err = world.expect_error();
    assert!(
        matches!(err, RoadNetworkError::NetworkUnavailable { .. }),
        "expected unavailable network, got {err:?}"
    );
}

#[then("the region is reported empty")]
fn then_empty(world: &OverpassWorld) {
    let err = world.expect_error();
    assert!(
        matches!(err, RoadNetworkError::EmptyRegion { .. }),
        "expected empty region, got {err:?}"
    );
}

#[scenario(path = "tests/features/overpass.feature", index = 0)]
fn crossing_becomes_graph(world: OverpassWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/overpass.feature", index = 1)]
fn overloaded_server(world: OverpassWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/overpass.feature", index = 2)]
fn empty_answer(world: OverpassWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/overpass.feature", index = 3)]
fn server_timeout(world: OverpassWorld) {
    let _ = world;
}
