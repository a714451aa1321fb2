use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_mentordashd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn mentordashd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn result(resp: &serde_json::Value) -> &serde_json::Value {
    assert_eq!(
        resp.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected ok response: {}",
        resp
    );
    resp.get("result").expect("result")
}

fn view(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, id: &str) -> serde_json::Value {
    let resp = request(stdin, reader, id, "nav.view", json!({}));
    result(&resp).clone()
}

fn payload() -> serde_json::Value {
    json!({
        "goal_set": {
            "Data Science": [
                { "student_id": 1, "name": "Asha", "goal": "Data Science",
                  "overall_cluster": "CONSISTENT", "overall_score": 0.8 },
                { "student_id": 2, "name": "Ben", "goal": "Data Science",
                  "overall_cluster": "LOW", "overall_score": 0.35 }
            ],
            "Web Dev": [
                { "student_id": 3, "name": "Cleo", "goal": "Web Dev",
                  "overall_cluster": "IMPROVING", "overall_score": 0.6 }
            ]
        },
        "goal_not_set": {
            "likelihood_domains": {
                "AI": [
                    { "student_id": 4, "name": "Dev", "top_domain": "AI",
                      "overall_cluster": "DROPPING", "overall_score": 0.45,
                      "status": "RECOMMENDED",
                      "predicted_domains": [
                          { "domain": "AI", "likelihood_score": 0.52 },
                          { "domain": "Web Dev", "likelihood_score": 0.31 }
                      ] }
                ]
            },
            "not_decided": {
                "confused": [
                    { "student_id": 5, "name": "Eli", "overall_cluster": "LOW",
                      "overall_score": 0.2, "status": "CONFUSED" }
                ],
                "new": [ { "student_id": 6, "name": "Fen", "status": "NEW" } ],
                "not_engaged": []
            }
        }
    })
}

#[test]
fn each_level_renders_its_own_view_model() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "dashboard.load",
        json!({ "mentorId": 2, "payload": payload() }),
    );

    // ROOT: two branch tiles
    let v = view(&mut stdin, &mut reader, "2");
    assert_eq!(v.get("level").and_then(|l| l.as_str()), Some("ROOT"));
    let tiles = v.get("tiles").and_then(|t| t.as_array()).expect("tiles");
    assert_eq!(tiles.len(), 2);
    assert_eq!(tiles[0].get("count").and_then(|c| c.as_u64()), Some(3));
    assert_eq!(tiles[1].get("count").and_then(|c| c.as_u64()), Some(3));

    // GOAL_SET_DOMAINS: one tile per chosen goal, alphabetical
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "nav.selectRoot",
        json!({ "branch": "GOAL_SET" }),
    );
    let v = view(&mut stdin, &mut reader, "4");
    let domains = v.get("domains").and_then(|d| d.as_array()).expect("domains");
    let names: Vec<&str> = domains
        .iter()
        .map(|d| d.get("domain").and_then(|v| v.as_str()).expect("domain"))
        .collect();
    assert_eq!(names, vec!["Data Science", "Web Dev"]);
    assert_eq!(domains[0].get("count").and_then(|c| c.as_u64()), Some(2));

    // GOAL_NOT_SET_DOMAINS: likelihood tiles plus the combined not-decided tile
    let _ = request(&mut stdin, &mut reader, "5", "nav.back", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "6",
        "nav.selectRoot",
        json!({ "branch": "GOAL_NOT_SET" }),
    );
    let v = view(&mut stdin, &mut reader, "7");
    let likelihood = v
        .get("likelihoodDomains")
        .and_then(|d| d.as_array())
        .expect("likelihood domains");
    assert_eq!(likelihood.len(), 1);
    assert_eq!(
        likelihood[0].get("domain").and_then(|v| v.as_str()),
        Some("AI")
    );
    assert_eq!(
        v.get("notDecided")
            .and_then(|n| n.get("count"))
            .and_then(|c| c.as_u64()),
        Some(2)
    );

    // NOT_DECIDED_CHILDREN: the three fixed categories with their counts
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "nav.selectNotDecidedParent",
        json!({}),
    );
    let v = view(&mut stdin, &mut reader, "9");
    let categories = v
        .get("categories")
        .and_then(|c| c.as_array())
        .expect("categories");
    let labels: Vec<&str> = categories
        .iter()
        .map(|c| c.get("category").and_then(|v| v.as_str()).expect("label"))
        .collect();
    assert_eq!(labels, vec!["Confused", "New", "Not Engaged"]);
    let counts: Vec<u64> = categories
        .iter()
        .map(|c| c.get("count").and_then(|v| v.as_u64()).expect("count"))
        .collect();
    assert_eq!(counts, vec![1, 1, 0]);

    // ENGAGEMENT: four cluster tiles over the selected slice
    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "nav.selectNotDecided",
        json!({ "category": "Confused" }),
    );
    let v = view(&mut stdin, &mut reader, "11");
    assert_eq!(v.get("domain").and_then(|d| d.as_str()), Some("Confused"));
    let clusters = v.get("clusters").and_then(|c| c.as_array()).expect("clusters");
    let labels: Vec<&str> = clusters
        .iter()
        .map(|c| c.get("cluster").and_then(|v| v.as_str()).expect("label"))
        .collect();
    assert_eq!(labels, vec!["CONSISTENT", "IMPROVING", "DROPPING", "LOW"]);
    assert_eq!(clusters[3].get("count").and_then(|c| c.as_u64()), Some(1));

    // STUDENTS: the terminal roster
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "nav.selectEngagement",
        json!({ "cluster": "LOW" }),
    );
    let v = view(&mut stdin, &mut reader, "13");
    assert_eq!(v.get("level").and_then(|l| l.as_str()), Some("STUDENTS"));
    assert_eq!(v.get("cluster").and_then(|c| c.as_str()), Some("LOW"));
    let roster = v.get("roster").and_then(|r| r.as_array()).expect("roster");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].get("name").and_then(|n| n.as_str()), Some("Eli"));

    drop(stdin);
    let _ = child.wait();
}
