//! Typed façades over the [`Proxy`](crate::proxy::Proxy), one method per
//! backend endpoint.
//!
//! Services never catch: a rejected response reaches the caller unchanged as
//! [`Error::Response`](crate::Error::Response).

mod auth;
mod dashboard;
mod short_link;

pub use auth::AuthService;
pub use dashboard::{AgentType, AnalyticsType, DashboardService};
pub use short_link::ShortLinkService;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::cookies::{CookiePolicy, CookieStore};
    use crate::proxy::testing::{MockTransport, reply};
    use crate::proxy::{Proxy, ProxyOptions};
    use crate::storage::MemoryStore;
    use crate::types::{LoginRequest, ShortLinkRequest};

    fn proxy(transport: MockTransport) -> Arc<Proxy<MockTransport>> {
        let cookies = Arc::new(CookieStore::new(CookiePolicy::new(false)));
        Arc::new(Proxy::new(
            transport,
            cookies,
            &MemoryStore::new(),
            ProxyOptions::default(),
        ))
    }

    fn link() -> serde_json::Value {
        json!({
            "id": 1,
            "originalUrl": "https://example.com/long",
            "shortCode": "abc123",
            "shortUrl": "http://sho.rt/abc123",
            "clickCount": 3
        })
    }

    #[tokio::test]
    async fn test_dashboard_paths_and_query() {
        let proxy = proxy(MockTransport::new(|request| match request.path.as_str() {
            "/statistics" => reply(
                200,
                json!({ "statusCode": 200, "data": {
                    "totalLink": 2, "totalClick": "9", "totalLinkExpired": 0
                }}),
            ),
            _ => reply(
                200,
                json!({
                    "statusCode": 200,
                    "data": [{ "date": "2024-05-01", "name": "Chrome", "count": 4 }]
                }),
            ),
        }));
        let dashboard = DashboardService::new(proxy.clone());

        let stats = dashboard.get_statistics("2024-05-01", "2024-05-31").await.unwrap();
        assert_eq!(stats.data.total_click, 9);

        let chart = dashboard
            .get_analytics_chart(AnalyticsType::ClickCount, "2024-05-01", "2024-05-31")
            .await
            .unwrap();
        assert_eq!(chart.data[0].count, 4);

        let agents = dashboard
            .get_agent_analytics(AgentType::Os, "2024-05-01", "2024-05-31")
            .await
            .unwrap();
        assert_eq!(agents.data[0].name.as_deref(), Some("Chrome"));

        let sent = proxy.transport().requests();
        let paths: Vec<&str> = sent.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            ["/statistics", "/statistics/click-count-chart", "/statistics/os-chart"]
        );
        for request in &sent {
            assert_eq!(request.method, Method::GET);
            assert_eq!(
                request.query,
                vec![
                    ("startDate".to_string(), "2024-05-01".to_string()),
                    ("endDate".to_string(), "2024-05-31".to_string()),
                ]
            );
        }
    }

    #[test]
    fn test_chart_segments() {
        assert_eq!(AnalyticsType::ShortLink.as_path_segment(), "short-link");
        assert_eq!(AgentType::Browser.as_path_segment(), "browser");
        assert_eq!(AgentType::Device.as_path_segment(), "device");
    }

    #[tokio::test]
    async fn test_short_link_endpoints() {
        let proxy = proxy(MockTransport::new(|request| {
            match (request.method.as_str(), request.path.as_str()) {
                ("POST", "/short-links") => {
                    reply(201, json!({ "statusCode": 201, "data": link() }))
                }
                ("GET", "/short-links/redirect/abc%2F1") => reply(
                    200,
                    json!({
                        "statusCode": 200,
                        "data": { "originalUrl": "https://example.com/long" }
                    }),
                ),
                _ => reply(200, json!({ "statusCode": 200, "data": [link()] })),
            }
        }));
        let links = ShortLinkService::new(proxy.clone());

        let created = links
            .create(&ShortLinkRequest {
                original_url: "https://example.com/long".into(),
                user_id: "7".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.status_code, 201);
        assert_eq!(created.data.short_code, "abc123");

        assert_eq!(links.find_all().await.unwrap().data.len(), 1);
        assert_eq!(links.me().await.unwrap().data[0].click_count, 3);

        let target = links.redirect("abc/1").await.unwrap();
        assert_eq!(target["originalUrl"], "https://example.com/long");

        let paths: Vec<String> = proxy.transport().requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            [
                "/short-links",
                "/short-links",
                "/short-links/me",
                "/short-links/redirect/abc%2F1"
            ]
        );
    }

    #[tokio::test]
    async fn test_auth_errors_propagate_unchanged() {
        let proxy = proxy(MockTransport::new(|_| {
            reply(401, json!({ "statusCode": 401, "message": "Invalid credentials" }))
        }));
        let auth = AuthService::new(proxy.clone());

        let err = auth
            .login(&LoginRequest {
                email: "a@b.com".into(),
                password: "x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(
            err.response().unwrap().body,
            json!({ "statusCode": 401, "message": "Invalid credentials" })
        );

        let sent = proxy.transport().requests();
        assert_eq!(sent[0].path, "/auth/login");
        assert_eq!(
            sent[0].body,
            Some(json!({ "email": "a@b.com", "password": "x" }))
        );
    }
}
