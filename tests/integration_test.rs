use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;

fn tmdb(url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tmdb-rest"));
    cmd.env("TMDB_API_KEY", "integration-key")
        .env_remove("TMDB_API_URL")
        .env_remove("TMDB_MAX_RETRIES")
        .env_remove("TMDB_LANGUAGE")
        .arg("--api-url")
        .arg(url);
    cmd
}

#[test]
fn test_end_to_end_get() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/movie/550")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("append_to_response".into(), "videos".into()),
            Matcher::UrlEncoded("api_key".into(), "integration-key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json;charset=utf-8")
        .with_body(r#"{"id":550,"title":"Fight Club"}"#)
        .create();

    tmdb(&url)
        .arg("get")
        .arg("/movie/{id}")
        .arg("-s")
        .arg("id=550")
        .arg("-q")
        .arg("append_to_response=videos")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title":"Fight Club""#));

    mock.assert();
}

#[test]
fn test_end_to_end_post_with_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/movie/550/rating")
        .match_query(Matcher::Any)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({ "value": 8.5 })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"status_code":1,"status_message":"Success."}"#)
        .create();

    tmdb(&url)
        .arg("post")
        .arg("/movie/{id}/rating")
        .arg("-s")
        .arg("id=550")
        .arg("--body")
        .arg(r#"{"value": 8.5}"#)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status_message\": \"Success.\""));

    mock.assert();
}

#[test]
fn test_unauthorized_exits_with_error() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", Matcher::Any)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key."}"#)
        .expect(1)
        .create();

    tmdb(&url)
        .arg("get")
        .arg("/account")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"))
        .stderr(predicate::str::contains("Invalid API key"));

    mock.assert();
}

#[test]
fn test_not_found_exits_with_error() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", "/movie/0")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status_code":34,"status_message":"The resource you requested could not be found."}"#)
        .create();

    tmdb(&url)
        .arg("get")
        .arg("/movie/{id}")
        .arg("-s")
        .arg("id=0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: /movie/{id}"));
}

#[test]
fn test_rate_limit_budget_exhausted() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", Matcher::Any)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_header("retry-after", "0")
        .with_body(r#"{"status_code":25,"status_message":"Your request count is over the allowed limit."}"#)
        .expect(2)
        .create();

    tmdb(&url)
        .arg("--retries")
        .arg("1")
        .arg("get")
        .arg("/trending/movie/week")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rate limit exceeded"));

    mock.assert();
}

#[test]
fn test_html_response_exits_with_error() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", Matcher::Any)
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html>Bad Gateway</html>")
        .create();

    tmdb(&url)
        .arg("get")
        .arg("/configuration")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected content type"));
}

#[test]
fn test_invalid_body_is_rejected_before_sending() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server.mock("POST", Matcher::Any).expect(0).create();

    tmdb(&url)
        .arg("post")
        .arg("/list")
        .arg("--body")
        .arg("{broken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid JSON"));

    mock.assert();
}

#[test]
fn test_api_url_and_retries_from_environment() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", Matcher::Any)
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .expect(1)
        .create();

    Command::new(cargo::cargo_bin!("tmdb-rest"))
        .env("TMDB_API_KEY", "integration-key")
        .env("TMDB_API_URL", &url)
        .env("TMDB_MAX_RETRIES", "0")
        .env_remove("TMDB_LANGUAGE")
        .arg("get")
        .arg("/movie/popular")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rate limit exceeded"));

    mock.assert();
}

#[test]
fn test_invalid_retries_in_environment_is_rejected_by_cli() {
    Command::new(cargo::cargo_bin!("tmdb-rest"))
        .env("TMDB_MAX_RETRIES", "many")
        .env_remove("TMDB_API_URL")
        .arg("get")
        .arg("/movie/popular")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'many' for '--retries <N>'"));
}
