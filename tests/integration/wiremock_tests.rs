//! End-to-end tests against a local mock server with the real HTTP fetcher

use crate::stubs::{fast_config, linkedin_detail, linkedin_listing};
use serde_json::json;
use std::sync::Arc;
use vaga_harvest::config::HttpConfig;
use vaga_harvest::fetch::HttpFetcher;
use vaga_harvest::harvest::HarvestContext;
use vaga_harvest::sites::{self, BalcaoAdapter, GupyAdapter, InfoJobsAdapter, LinkedInAdapter, Site};
use vaga_harvest::{Harvester, RecencyFilter, SearchRequest};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_linkedin_harvest_over_http() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let first = format!("{}/linkedin/jobs/view/1", uri);
    let second = format!("{}/linkedin/jobs/view/2", uri);
    Mock::given(method("GET"))
        .and(path("/linkedin/jobs/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(linkedin_listing(&[
            ("Analista de Projetos", first.as_str()),
            ("Analista Fiscal", second.as_str()),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/linkedin/jobs/view/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(linkedin_detail("Gerenciar projeto e arquivos do computador")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/linkedin/jobs/view/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harvester = Harvester::with_http(fast_config()).unwrap().with_adapter(
        Site::LinkedIn,
        Arc::new(LinkedInAdapter::with_base_url(format!("{}/linkedin", uri))),
    );

    let outcome = harvester
        .harvest(
            &[format!("{}/linkedin/jobs/search?keywords=analista", uri)],
            &["projeto".to_string(), "arquivos".to_string()],
            RecencyFilter::Any,
        )
        .await;

    // The posting whose detail page failed is dropped
    assert_eq!(outcome.total_count, 1);
    let job = &outcome.jobs[0];
    assert_eq!(job.title, "Analista de Projetos");
    assert_eq!(job.url, first);
    assert_eq!(job.location, "São Paulo, SP");
    assert!((job.relevance_score - 5.0 / 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_balcao_detail_is_posted_by_id() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let listing = r#"<html><body><fieldset>
        <div class="panel-body panel-vaga link-draw-vaga" id-vaga="4471">
          <div>
            <div>Recepcionista</div>
            <div>Publicada em <strong>12/05/2023</strong></div>
          </div>
          <div>Local: Campinas - SP</div>
          <div>Salário a combinar</div>
          <div>
            <div><strong>Empresa:</strong> <span>Clínica Bem Estar</span></div>
            <!-- <a href="/vaga/recepcionista-4471">ver vaga</a> -->
          </div>
        </div>
    </fieldset></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/vagas-por-cargo/recepcionista"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Vaga/GetVagaById"))
        .and(body_string_contains("id=4471"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vaga": {"Id": 4471, "Descricao": "<p>Atender pacientes e organizar arquivos</p>"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let ctx = HarvestContext::standalone(Arc::new(fetcher), vec!["arquivos".to_string()]);
    let adapter = Arc::new(BalcaoAdapter::with_base_url(uri.clone()));

    let outcome = sites::run_adapter(
        adapter,
        ctx,
        vec![format!(
            "{}/vagas-por-cargo/recepcionista?criterio=Recepcionista&cidadeEstado=Campinas",
            uri
        )],
    )
    .await;

    assert_eq!(outcome.total_count, 1);
    let job = &outcome.jobs[0];
    assert_eq!(job.title, "Recepcionista");
    assert_eq!(job.company, "Clínica Bem Estar");
    assert_eq!(job.posted_at, "12/05/2023");
    assert_eq!(job.url, format!("{}/vaga/recepcionista-4471", uri));
    assert!(job.relevance_score > 0.0);
}

#[tokio::test]
async fn test_gupy_search_plans_and_filters_by_recency() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let today = chrono::Local::now().date_naive();

    Mock::given(method("GET"))
        .and(path("/gupy/api/v1/jobs"))
        .and(query_param("jobName", "Python"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "name": "Python Developer",
                    "careerPageName": "Acme",
                    "city": "Curitiba",
                    "state": "Paraná",
                    "country": "Brasil",
                    "publishedDate": format!("{}T09:00:00.000Z", today),
                    "description": "Automatizar rotinas em python",
                    "jobUrl": "https://acme.gupy.io/jobs/1"
                },
                {
                    "name": "Python Legacy",
                    "publishedDate": "2019-03-01T09:00:00.000Z",
                    "description": "Manter sistemas em python",
                    "jobUrl": "https://acme.gupy.io/jobs/2"
                },
                {
                    "name": "Sem descrição",
                    "publishedDate": format!("{}T10:00:00.000Z", today),
                    "jobUrl": "https://acme.gupy.io/jobs/3"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = Harvester::with_http(fast_config()).unwrap().with_adapter(
        Site::Gupy,
        Arc::new(GupyAdapter::with_base_url(format!("{}/gupy", uri))),
    );
    let request = SearchRequest {
        titles: vec!["Python".to_string()],
        keywords: vec!["python".to_string()],
        recency: RecencyFilter::Week,
        location: "Brazil".to_string(),
    };

    let outcome = harvester.search(&request, Some(&[Site::Gupy])).await;

    assert_eq!(outcome.total_count, 1);
    let job = &outcome.jobs[0];
    assert_eq!(job.title, "Python Developer");
    assert_eq!(job.location, "Curitiba, Paraná, Brasil");
    assert_eq!(job.url, "https://acme.gupy.io/jobs/1");
    assert!(job.relevance_score > 0.0);
}

#[tokio::test]
async fn test_infojobs_plan_resolves_location_id() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/mf-publicarea/api/autocompleteapi/locations"))
        .and(query_param("query", "Porto Alegre"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [
                {"value": "Porto Alegre - RS", "data": {"id": 5208622}},
                {"value": "Porto Alegre do Norte - MT", "data": {"id": 5208999}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = Harvester::with_http(fast_config())
        .unwrap()
        .with_adapter(Site::InfoJobs, Arc::new(InfoJobsAdapter::with_base_url(uri.clone())));
    let request = SearchRequest {
        titles: vec!["Auxiliar".to_string()],
        keywords: Vec::new(),
        recency: RecencyFilter::Any,
        location: "Porto Alegre, RS, Brazil".to_string(),
    };

    let urls = harvester.plan(&request, Some(&[Site::InfoJobs])).await;

    assert_eq!(
        urls,
        vec![format!("{}/empregos.aspx?palabra=Auxiliar&poblacion=5208622", uri)]
    );
}

#[tokio::test]
async fn test_infojobs_plan_without_location_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mf-publicarea/api/autocompleteapi/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"suggestions": []})))
        .mount(&server)
        .await;

    let harvester = Harvester::with_http(fast_config())
        .unwrap()
        .with_adapter(Site::InfoJobs, Arc::new(InfoJobsAdapter::with_base_url(server.uri())));
    let request = SearchRequest {
        titles: vec!["Auxiliar".to_string()],
        location: "Atlantis, XX, Brazil".to_string(),
        ..Default::default()
    };

    let urls = harvester.plan(&request, Some(&[Site::InfoJobs])).await;

    assert_eq!(urls.len(), 1);
    assert!(!urls[0].contains("poblacion"));
}
