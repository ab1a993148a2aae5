use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::{tempdir, NamedTempFile};

use route_resilience_analyzer::cluster::metrics::{community_stats, modularity};
use route_resilience_analyzer::data::airports::load_airports;
use route_resilience_analyzer::data::routes::load_routes;
use route_resilience_analyzer::storage::{save_results, CommunitySummary};
use route_resilience_analyzer::{AnalysisContext, AnalyzerError, CentralityMetric, Config};

const AIRPORTS: &str = "\
id,name,city,country,iata,icao,latitude,longitude
1,Alpha,Alpha City,Aland,AAA,KAAA,0.0,0.0
2,Bravo,Bravo City,Aland,BBB,KBBB,1.0,1.0
3,Charlie,Charlie City,Aland,CCC,KCCC,2.0,2.0
4,Xray,Xray City,Bland,XXX,KXXX,40.0,40.0
5,Yankee,Yankee City,Bland,YYY,KYYY,41.0,41.0
6,Zulu,Zulu City,Bland,ZZZ,KZZZ,42.0,42.0
7,Ghost,Ghost Town,Nowhere,GGG,KGGG,,
";

// Two triangles joined by the CCC - XXX bridge, plus rows that must be dropped
const ROUTES: &str = "\
airline,airline_id,src_airport,src_id,dst_airport,dst_id,codeshare,stops,equipment
QQ,1,AAA,1,BBB,2,,0,320
QQ,1,BBB,1,AAA,2,,0,320
QQ,1,BBB,2,CCC,3,,0,320
QQ,1,CCC,3,AAA,1,,,320
QQ,1,XXX,4,YYY,5,,0,320
QQ,1,YYY,5,ZZZ,6,,1,320
QQ,1,ZZZ,6,XXX,4,,0,320
QQ,1,CCC,3,XXX,4,,0,320
QQ,1,AAA,1,ZZZ,6,,3,320
QQ,1,AAA,1,GGG,7,,0,320
";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn load_context(config: &Config) -> AnalysisContext {
    let airports_file = write_temp(AIRPORTS);
    let routes_file = write_temp(ROUTES);

    let airports = load_airports(airports_file.path(), config.use_ids).unwrap();
    let routes = load_routes(routes_file.path(), config).unwrap();
    AnalysisContext::new(airports, routes, config).unwrap()
}

fn codes(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn loads_csv_into_an_undirected_graph() {
    let context = load_context(&Config::default());
    let health = context.health();

    // Ghost has no coordinates, the 3-stop route is filtered, reverse
    // duplicates collapse into one edge and GGG never enters the graph
    assert_eq!(health.airports, 6);
    assert_eq!(health.graph_nodes, 6);
    assert_eq!(health.graph_edges, 7);
    assert!(!context.graph().contains("GGG"));
}

#[test]
fn removing_the_bridge_strands_one_triangle() {
    let context = load_context(&Config::default());
    let result = context.analyze(&codes(&["CCC"]), 0, CentralityMetric::Betweenness);

    assert_eq!(result.before.largest_component_size, 6);
    assert_eq!(result.after.node_count, 5);
    assert_eq!(result.after.largest_component_size, 3);
    assert_eq!(
        result.stranded.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["AAA", "BBB"]
    );
    assert!(result.after.global_efficiency < result.before.global_efficiency);
}

#[test]
fn auto_top_n_targets_bridge_endpoints() {
    let context = load_context(&Config::default());
    let result = context.analyze(&HashSet::new(), 2, CentralityMetric::Betweenness);

    assert_eq!(result.disrupted_list, vec!["CCC".to_string(), "XXX".to_string()]);
    assert_eq!(result.after.edge_count, 2);
}

#[test]
fn communities_follow_the_triangles() {
    let context = load_context(&Config::default());
    let partition = context.partition();

    assert_eq!(context.communities().community_count(), 2);
    assert_eq!(partition.group_of("AAA"), partition.group_of("CCC"));
    assert_ne!(partition.group_of("AAA"), partition.group_of("XXX"));

    let features = context.build_features(&codes(&["BBB"]));
    let bridges: Vec<(&str, &str)> = features
        .routes
        .iter()
        .filter(|route| route.group == -1)
        .map(|route| (route.src.as_str(), route.dst.as_str()))
        .collect();
    assert_eq!(bridges, vec![("CCC", "XXX")]);
}

#[test]
fn partition_is_stable_across_contexts() {
    let first = load_context(&Config::default());
    let second = load_context(&Config::default());

    assert_eq!(first.communities(), second.communities());
}

#[test]
fn id_mode_keys_by_numeric_ids() {
    let config = Config::new(1, None, true);
    let context = load_context(&config);

    assert!(context.graph().contains("1"));
    assert!(!context.graph().contains("AAA"));
    assert_eq!(context.graph().edge_count(), 7);
}

#[test]
fn route_cap_limits_the_graph() {
    let config = Config::new(1, Some(2), false);
    let context = load_context(&config);

    assert_eq!(context.health().routes, 2);
}

#[test]
fn missing_file_is_reported() {
    let err = load_airports(Path::new("/definitely/not/here.csv"), false).unwrap_err();
    assert!(matches!(err, AnalyzerError::MissingData(_)));
}

#[test]
fn unknown_metric_is_rejected() {
    let err = "eigenvector".parse::<CentralityMetric>().unwrap_err();
    assert!(matches!(err, AnalyzerError::UnknownMetric(_)));
}

#[test]
fn saves_every_output_file() {
    let config = Config {
        gc_steps: 4,
        ..Config::default()
    };
    let context = load_context(&config);
    let result = context.analyze(&codes(&["CCC"]), 0, CentralityMetric::Degree);
    let features = context.build_features(&codes(&["CCC"]));
    let communities = CommunitySummary {
        modularity: modularity(context.graph(), context.partition()),
        stats: community_stats(context.graph(), context.communities()),
    };

    let dir = tempdir().unwrap();
    save_results(&result, &features, &context.health(), &communities, dir.path()).unwrap();

    for name in ["analysis.json", "airports.geojson", "routes.geojson", "summary.json"] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }

    let routes: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("routes.geojson")).unwrap()).unwrap();
    let first = &routes["features"][0];
    assert_eq!(first["geometry"]["coordinates"].as_array().unwrap().len(), 5);

    let analysis: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("analysis.json")).unwrap()).unwrap();
    assert_eq!(analysis["after"]["largest_component"], 3);
    assert_eq!(analysis["disrupted_list"][0], "CCC");
}
