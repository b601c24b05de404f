//! Admin API request messages read by the project authorization layer.
//!
//! Field numbers follow `flyteidl.admin` / `flyteidl.core`. Only the fields
//! that address a resource are modelled; unknown fields are skipped on decode.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResourceType {
    Unspecified = 0,
    Task = 1,
    Workflow = 2,
    LaunchPlan = 3,
    Dataset = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Identifier {
    #[prost(enumeration = "ResourceType", tag = "1")]
    pub resource_type: i32,
    #[prost(string, tag = "2")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub version: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedEntityIdentifier {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionIdentifier {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeExecutionIdentifier {
    #[prost(string, tag = "1")]
    pub node_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub execution_id: ::core::option::Option<WorkflowExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskExecutionIdentifier {
    #[prost(message, optional, tag = "1")]
    pub task_id: ::core::option::Option<Identifier>,
    #[prost(message, optional, tag = "2")]
    pub node_execution_id: ::core::option::Option<NodeExecutionIdentifier>,
    #[prost(uint32, tag = "3")]
    pub retry_attempt: u32,
}

// Tasks, workflows and launch plans

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskCreateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<Identifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowCreateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<Identifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LaunchPlanCreateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<Identifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LaunchPlanUpdateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<Identifier>,
    #[prost(int32, tag = "2")]
    pub state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActiveLaunchPlanRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<NamedEntityIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActiveLaunchPlanListRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(uint32, tag = "3")]
    pub limit: u32,
    #[prost(string, tag = "4")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ObjectGetRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<Identifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedEntityIdentifierListRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(uint32, tag = "3")]
    pub limit: u32,
    #[prost(string, tag = "4")]
    pub token: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub filters: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceListRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<NamedEntityIdentifier>,
    #[prost(uint32, tag = "2")]
    pub limit: u32,
    #[prost(string, tag = "3")]
    pub token: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub filters: ::prost::alloc::string::String,
}

// Executions

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionCreateRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionRelaunchRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionRecoverRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionGetRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionUpdateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(int32, tag = "2")]
    pub state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionGetDataRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecutionTerminateRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(string, tag = "2")]
    pub cause: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowExecutionGetMetricsRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(int32, tag = "2")]
    pub depth: i32,
}

// Node and task executions

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeExecutionGetRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<NodeExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetDynamicNodeWorkflowRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<NodeExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeExecutionListRequest {
    #[prost(message, optional, tag = "1")]
    pub workflow_execution_id: ::core::option::Option<WorkflowExecutionIdentifier>,
    #[prost(uint32, tag = "2")]
    pub limit: u32,
    #[prost(string, tag = "3")]
    pub token: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub filters: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub unique_parent_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeExecutionForTaskListRequest {
    #[prost(message, optional, tag = "1")]
    pub task_execution_id: ::core::option::Option<TaskExecutionIdentifier>,
    #[prost(uint32, tag = "2")]
    pub limit: u32,
    #[prost(string, tag = "3")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeExecutionGetDataRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<NodeExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskExecutionGetRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<TaskExecutionIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskExecutionListRequest {
    #[prost(message, optional, tag = "1")]
    pub node_execution_id: ::core::option::Option<NodeExecutionIdentifier>,
    #[prost(uint32, tag = "2")]
    pub limit: u32,
    #[prost(string, tag = "3")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskExecutionGetDataRequest {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<TaskExecutionIdentifier>,
}

// Projects

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Domain {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Project {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub domains: ::prost::alloc::vec::Vec<Domain>,
    #[prost(string, tag = "4")]
    pub description: ::prost::alloc::string::String,
    #[prost(int32, tag = "6")]
    pub state: i32,
    #[prost(string, tag = "7")]
    pub org: ::prost::alloc::string::String,
}

impl Project {
    pub fn with_id(id: impl Into<::prost::alloc::string::String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Projects {
    #[prost(message, repeated, tag = "1")]
    pub projects: ::prost::alloc::vec::Vec<Project>,
    #[prost(string, tag = "2")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectListRequest {
    #[prost(uint32, tag = "1")]
    pub limit: u32,
    #[prost(string, tag = "2")]
    pub token: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub filters: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectRegisterRequest {
    #[prost(message, optional, tag = "1")]
    pub project: ::core::option::Option<Project>,
}

// Matchable attributes

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectAttributes {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectDomainAttributes {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowAttributes {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub workflow: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub org: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectAttributesUpdateRequest {
    #[prost(message, optional, tag = "1")]
    pub attributes: ::core::option::Option<ProjectAttributes>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectAttributesGetRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub resource_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectAttributesDeleteRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub resource_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectDomainAttributesUpdateRequest {
    #[prost(message, optional, tag = "1")]
    pub attributes: ::core::option::Option<ProjectDomainAttributes>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectDomainAttributesGetRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub resource_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectDomainAttributesDeleteRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub resource_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowAttributesUpdateRequest {
    #[prost(message, optional, tag = "1")]
    pub attributes: ::core::option::Option<WorkflowAttributes>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowAttributesGetRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub workflow: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub resource_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WorkflowAttributesDeleteRequest {
    #[prost(string, tag = "1")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub domain: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub workflow: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub resource_type: i32,
}

// Named entities and descriptions

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedEntityListRequest {
    #[prost(enumeration = "ResourceType", tag = "1")]
    pub resource_type: i32,
    #[prost(string, tag = "2")]
    pub project: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub domain: ::prost::alloc::string::String,
    #[prost(uint32, tag = "4")]
    pub limit: u32,
    #[prost(string, tag = "5")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedEntityGetRequest {
    #[prost(enumeration = "ResourceType", tag = "1")]
    pub resource_type: i32,
    #[prost(message, optional, tag = "2")]
    pub id: ::core::option::Option<NamedEntityIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedEntityUpdateRequest {
    #[prost(enumeration = "ResourceType", tag = "1")]
    pub resource_type: i32,
    #[prost(message, optional, tag = "2")]
    pub id: ::core::option::Option<NamedEntityIdentifier>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescriptionEntityListRequest {
    #[prost(enumeration = "ResourceType", tag = "1")]
    pub resource_type: i32,
    #[prost(message, optional, tag = "2")]
    pub id: ::core::option::Option<NamedEntityIdentifier>,
    #[prost(uint32, tag = "3")]
    pub limit: u32,
    #[prost(string, tag = "4")]
    pub token: ::prost::alloc::string::String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_decode_ignores_unknown_fields() {
        // ExecutionCreateRequest{project: "p1", domain: "d"} plus an unmodelled field 5.
        let mut buf = Vec::new();
        ExecutionCreateRequest {
            project: "p1".into(),
            domain: "d".into(),
            name: String::new(),
        }
        .encode(&mut buf)
        .unwrap();
        buf.extend_from_slice(&[0x2a, 0x02, 0x08, 0x01]);

        let decoded = ExecutionCreateRequest::decode(buf.as_slice()).unwrap();
        assert_eq!(decoded.project, "p1");
        assert_eq!(decoded.domain, "d");
    }
}
