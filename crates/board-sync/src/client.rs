//! GraphQL client for the GitHub Projects API.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::api::BoardApi;
use crate::error::{ApiError, FetchError, MutateError};
use crate::models::{FieldValue, ItemSnapshot};
use crate::schema::{FieldNode, ProjectSchema, FIELD_PAGE_SIZE};

/// GitHub GraphQL endpoint
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

const CLIENT_USER_AGENT: &str = concat!("board-sync/", env!("CARGO_PKG_VERSION"));

/// GitHub Projects GraphQL client
#[derive(Debug, Clone)]
pub struct GitHubProjectsClient {
    client: reqwest::Client,
    api_url: String,
}

/// GraphQL request body
#[derive(Debug, Serialize)]
struct GraphQLRequest<V: Serialize> {
    query: &'static str,
    variables: V,
}

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error
#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// A `{ nodes: [...] }` connection
#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

/// Node with an id and a name (fields, issue types)
#[derive(Debug, Deserialize)]
struct NamedNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

impl GitHubProjectsClient {
    /// Create a new client authenticated with a GitHub token.
    ///
    /// # Errors
    /// Returns error if headers or the HTTP client cannot be constructed
    pub fn new(token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid GitHub token")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        // Issue types are still behind a schema preview
        headers.insert("GraphQL-Features", HeaderValue::from_static("issue_types"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: GITHUB_GRAPHQL_URL.to_string(),
        })
    }

    /// Point the client at a different GraphQL endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Execute a GraphQL query/mutation
    async fn execute<V: Serialize, R: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: V,
    ) -> Result<R, ApiError> {
        let request = GraphQLRequest { query, variables };

        let response = self.client.post(&self.api_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let gql_response: GraphQLResponse<R> = response.json().await?;

        if let Some(errors) = gql_response.errors.filter(|errors| !errors.is_empty()) {
            let error_messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::GraphQl(error_messages.join(", ")));
        }

        gql_response
            .data
            .ok_or(ApiError::MissingData("data"))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    async fn query_project_schema(
        &self,
        organization: &str,
        board_number: u32,
    ) -> Result<ProjectSchema, ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            organization: &'a str,
            number: u32,
            first: usize,
        }

        #[derive(Deserialize)]
        struct Response {
            organization: Option<Organization>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Organization {
            id: String,
            project_v2: Option<Project>,
        }

        #[derive(Deserialize)]
        struct Project {
            id: String,
            fields: FieldConnection,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct FieldConnection {
            #[serde(default)]
            total_count: Option<usize>,
            #[serde(default)]
            nodes: Vec<FieldNode>,
        }

        const QUERY: &str = r"
            query ProjectSchema($organization: String!, $number: Int!, $first: Int!) {
                organization(login: $organization) {
                    id
                    projectV2(number: $number) {
                        id
                        fields(first: $first) {
                            totalCount
                            nodes {
                                __typename
                                ... on ProjectV2FieldCommon {
                                    id
                                    name
                                }
                                ... on ProjectV2SingleSelectField {
                                    options {
                                        id
                                        name
                                    }
                                }
                            }
                        }
                    }
                }
            }
        ";

        let response: Response = self
            .execute(
                QUERY,
                Variables {
                    organization,
                    number: board_number,
                    first: FIELD_PAGE_SIZE,
                },
            )
            .await?;

        let organization = response
            .organization
            .ok_or(ApiError::MissingData("organization"))?;
        let project = organization
            .project_v2
            .ok_or(ApiError::MissingData("organization.projectV2"))?;

        Ok(ProjectSchema::from_field_nodes(
            project.id,
            Some(organization.id),
            project.fields.nodes,
            project.fields.total_count,
        ))
    }

    async fn query_field_ids(&self, node_id: &str) -> Result<HashMap<String, String>, ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            id: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            node: Option<Node>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Node {
            #[serde(default)]
            fields: Option<Connection<NamedNode>>,
            #[serde(default)]
            issue_types: Option<Connection<NamedNode>>,
        }

        const QUERY: &str = r"
            query FieldIds($id: ID!) {
                node(id: $id) {
                    ... on ProjectV2 {
                        fields(first: 100) {
                            nodes {
                                ... on ProjectV2FieldCommon {
                                    id
                                    name
                                }
                            }
                        }
                    }
                    ... on Organization {
                        issueTypes(first: 100) {
                            nodes {
                                id
                                name
                            }
                        }
                    }
                }
            }
        ";

        let response: Response = self.execute(QUERY, Variables { id: node_id }).await?;
        let node = response.node.ok_or(ApiError::MissingData("node"))?;

        let ids = node
            .fields
            .into_iter()
            .chain(node.issue_types)
            .flat_map(|connection| connection.nodes)
            .filter(|n| !n.name.is_empty() && !n.id.is_empty())
            .map(|n| (n.name.to_lowercase(), n.id))
            .collect();
        Ok(ids)
    }

    async fn query_item_snapshot(&self, item_node_id: &str) -> Result<ItemSnapshot, ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            id: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            node: Option<Item>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Item {
            #[serde(default)]
            status: Option<SelectValue>,
            #[serde(default)]
            start_date: Option<DateValue>,
            #[serde(default)]
            end_date: Option<DateValue>,
        }

        #[derive(Deserialize)]
        struct SelectValue {
            #[serde(default)]
            name: Option<String>,
        }

        #[derive(Deserialize)]
        struct DateValue {
            #[serde(default)]
            date: Option<String>,
        }

        const QUERY: &str = r#"
            query ItemSnapshot($id: ID!) {
                node(id: $id) {
                    ... on ProjectV2Item {
                        status: fieldValueByName(name: "Status") {
                            ... on ProjectV2ItemFieldSingleSelectValue {
                                name
                            }
                        }
                        startDate: fieldValueByName(name: "Start date") {
                            ... on ProjectV2ItemFieldDateValue {
                                date
                            }
                        }
                        endDate: fieldValueByName(name: "End date") {
                            ... on ProjectV2ItemFieldDateValue {
                                date
                            }
                        }
                    }
                }
            }
        "#;

        let response: Response = self.execute(QUERY, Variables { id: item_node_id }).await?;
        let item = response.node.ok_or(ApiError::MissingData("node"))?;

        Ok(ItemSnapshot {
            status: item.status.and_then(|v| v.name).unwrap_or_default(),
            start_date: item.start_date.and_then(|v| v.date).unwrap_or_default(),
            end_date: item.end_date.and_then(|v| v.date).unwrap_or_default(),
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    async fn update_item_field(
        &self,
        board_id: &str,
        item_id: &str,
        field_id: &str,
        value: FieldValue,
    ) -> Result<(), ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            input: Input<'a>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Input<'a> {
            project_id: &'a str,
            item_id: &'a str,
            field_id: &'a str,
            value: FieldValue,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            update_project_v2_item_field_value: Option<Payload>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            project_v2_item: Option<ItemRef>,
        }

        #[derive(Deserialize)]
        struct ItemRef {
            #[allow(dead_code)]
            id: String,
        }

        const MUTATION: &str = r"
            mutation UpdateItemField($input: UpdateProjectV2ItemFieldValueInput!) {
                updateProjectV2ItemFieldValue(input: $input) {
                    projectV2Item {
                        id
                    }
                }
            }
        ";

        let response: Response = self
            .execute(
                MUTATION,
                Variables {
                    input: Input {
                        project_id: board_id,
                        item_id,
                        field_id,
                        value,
                    },
                },
            )
            .await?;

        response
            .update_project_v2_item_field_value
            .and_then(|p| p.project_v2_item)
            .map(|_| ())
            .ok_or(ApiError::MissingData("updateProjectV2ItemFieldValue.projectV2Item"))
    }

    async fn add_item(&self, board_id: &str, content_node_id: &str) -> Result<String, ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            input: Input<'a>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Input<'a> {
            project_id: &'a str,
            content_id: &'a str,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            add_project_v2_item_by_id: Option<Payload>,
        }

        #[derive(Deserialize)]
        struct Payload {
            item: Option<ItemRef>,
        }

        #[derive(Deserialize)]
        struct ItemRef {
            id: String,
        }

        const MUTATION: &str = r"
            mutation AddItem($input: AddProjectV2ItemByIdInput!) {
                addProjectV2ItemById(input: $input) {
                    item {
                        id
                    }
                }
            }
        ";

        let response: Response = self
            .execute(
                MUTATION,
                Variables {
                    input: Input {
                        project_id: board_id,
                        content_id: content_node_id,
                    },
                },
            )
            .await?;

        response
            .add_project_v2_item_by_id
            .and_then(|p| p.item)
            .map(|item| item.id)
            .ok_or(ApiError::MissingData("addProjectV2ItemById.item"))
    }

    async fn update_issue_type(&self, issue_node_id: &str, type_id: &str) -> Result<(), ApiError> {
        #[derive(Serialize)]
        struct Variables<'a> {
            input: Input<'a>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Input<'a> {
            issue_id: &'a str,
            issue_type_id: &'a str,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            update_issue_issue_type: Option<Payload>,
        }

        #[derive(Deserialize)]
        struct Payload {
            issue: Option<IssueRef>,
        }

        #[derive(Deserialize)]
        struct IssueRef {
            #[allow(dead_code)]
            id: String,
        }

        const MUTATION: &str = r"
            mutation SetIssueType($input: UpdateIssueIssueTypeInput!) {
                updateIssueIssueType(input: $input) {
                    issue {
                        id
                    }
                }
            }
        ";

        let response: Response = self
            .execute(
                MUTATION,
                Variables {
                    input: Input {
                        issue_id: issue_node_id,
                        issue_type_id: type_id,
                    },
                },
            )
            .await?;

        response
            .update_issue_issue_type
            .and_then(|p| p.issue)
            .map(|_| ())
            .ok_or(ApiError::MissingData("updateIssueIssueType.issue"))
    }
}

#[async_trait]
impl BoardApi for GitHubProjectsClient {
    #[instrument(skip(self))]
    async fn fetch_project_schema(
        &self,
        organization: &str,
        board_number: u32,
    ) -> Result<ProjectSchema, FetchError> {
        self.query_project_schema(organization, board_number)
            .await
            .map_err(|e| FetchError::new("project schema", e))
    }

    #[instrument(skip(self))]
    async fn fetch_field_ids_by_name(
        &self,
        node_id: &str,
    ) -> Result<HashMap<String, String>, FetchError> {
        let ids = self
            .query_field_ids(node_id)
            .await
            .map_err(|e| FetchError::new("field ids", e))?;
        debug!(count = ids.len(), "Retrieved field ids");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn fetch_item_snapshot(&self, item_node_id: &str) -> Result<ItemSnapshot, FetchError> {
        self.query_item_snapshot(item_node_id)
            .await
            .map_err(|e| FetchError::new("item snapshot", e))
    }

    #[instrument(skip(self))]
    async fn mutate_field_value(
        &self,
        board_id: &str,
        item_id: &str,
        field_id: &str,
        value: FieldValue,
    ) -> Result<(), MutateError> {
        self.update_item_field(board_id, item_id, field_id, value)
            .await
            .map_err(|e| MutateError::new("update item field value", e))
    }

    #[instrument(skip(self))]
    async fn add_item_to_board(
        &self,
        board_id: &str,
        content_node_id: &str,
    ) -> Result<String, MutateError> {
        self.add_item(board_id, content_node_id)
            .await
            .map_err(|e| MutateError::new("add item to board", e))
    }

    #[instrument(skip(self))]
    async fn set_issue_type(&self, issue_node_id: &str, type_id: &str) -> Result<(), MutateError> {
        self.update_issue_type(issue_node_id, type_id)
            .await
            .map_err(|e| MutateError::new("set issue type", e))
    }
}
