use std::sync::Arc;

use crate::error::Error;
use crate::proxy::{HttpTransport, Proxy, Transport};
use crate::types::{AgentAnalytics, ApiResponse, ShortLinkAnalytics, Statistics};

/// Time-series charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyticsType {
    ShortLink,
    ClickCount,
}

impl AnalyticsType {
    #[must_use]
    pub fn as_path_segment(self) -> &'static str {
        match self {
            Self::ShortLink => "short-link",
            Self::ClickCount => "click-count",
        }
    }
}

/// Client-agent breakdown charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentType {
    Browser,
    Device,
    Os,
}

impl AgentType {
    #[must_use]
    pub fn as_path_segment(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Device => "device",
            Self::Os => "os",
        }
    }
}

/// `/statistics` endpoints. Dates are passed through as given.
pub struct DashboardService<T = HttpTransport> {
    proxy: Arc<Proxy<T>>,
}

impl<T> Clone for DashboardService<T> {
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
        }
    }
}

impl<T: Transport> DashboardService<T> {
    #[must_use]
    pub fn new(proxy: Arc<Proxy<T>>) -> Self {
        Self { proxy }
    }

    /// `GET /statistics?startDate&endDate`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn get_statistics(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<ApiResponse<Statistics>, Error> {
        self.proxy
            .get_json("/statistics", &range(start_date, end_date))
            .await
    }

    /// `GET /statistics/<type>-chart?startDate&endDate`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn get_analytics_chart(
        &self,
        analytics_type: AnalyticsType,
        start_date: &str,
        end_date: &str,
    ) -> Result<ApiResponse<Vec<ShortLinkAnalytics>>, Error> {
        let path = chart_path(analytics_type.as_path_segment());
        self.proxy
            .get_json(&path, &range(start_date, end_date))
            .await
    }

    /// `GET /statistics/<agent>-chart?startDate&endDate`.
    ///
    /// # Errors
    ///
    /// Propagates the proxy's [`Error`] unchanged.
    pub async fn get_agent_analytics(
        &self,
        agent_type: AgentType,
        start_date: &str,
        end_date: &str,
    ) -> Result<ApiResponse<Vec<AgentAnalytics>>, Error> {
        let path = chart_path(agent_type.as_path_segment());
        self.proxy
            .get_json(&path, &range(start_date, end_date))
            .await
    }
}

fn chart_path(segment: &str) -> String {
    format!("/statistics/{segment}-chart")
}

fn range<'a>(start_date: &'a str, end_date: &'a str) -> [(&'static str, &'a str); 2] {
    [("startDate", start_date), ("endDate", end_date)]
}
