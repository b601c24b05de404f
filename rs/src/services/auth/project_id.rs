use std::any::Any;
use std::collections::HashMap;

use crate::proto::admin::{self, Identifier, NamedEntityIdentifier, NodeExecutionIdentifier};
use crate::proto::admin::{TaskExecutionIdentifier, WorkflowExecutionIdentifier};
use crate::proto::service as method;

type Extractor = Box<dyn Fn(&(dyn Any + Send + Sync)) -> String + Send + Sync>;

/// Finds the project an admin RPC targets.
///
/// Only methods registered here are project-scoped; anything else resolves to
/// no project and is not gated by project authorization. A request whose type
/// does not match its method's registration also resolves to no project.
pub struct ProjectIdResolver {
    extractors: HashMap<&'static str, Extractor>,
}

impl std::fmt::Debug for ProjectIdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectIdResolver")
            .field("methods", &self.extractors.len())
            .finish()
    }
}

impl Default for ProjectIdResolver {
    fn default() -> Self {
        Self::admin()
    }
}

impl ProjectIdResolver {
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Register (or replace) the extractor for one fully-qualified method.
    pub fn register<T>(&mut self, full_method: &'static str, extract: fn(&T) -> String)
    where
        T: Any + Send + Sync,
    {
        self.extractors.insert(
            full_method,
            Box::new(move |request: &(dyn Any + Send + Sync)| {
                request
                    .downcast_ref::<T>()
                    .map(extract)
                    .unwrap_or_default()
            }),
        );
    }

    /// Returns "" when the method is not project-scoped.
    pub fn resolve(&self, full_method: &str, request: &(dyn Any + Send + Sync)) -> String {
        match self.extractors.get(full_method) {
            Some(extract) => extract(request),
            None => String::new(),
        }
    }

    pub fn is_project_scoped(&self, full_method: &str) -> bool {
        self.extractors.contains_key(full_method)
    }

    /// Every project-scoped admin RPC.
    ///
    /// ListProjects is filtered per identity instead of gated, and the event
    /// RPCs carry no project of their own.
    pub fn admin() -> Self {
        let mut r = Self::empty();

        // Tasks
        r.register(method::CREATE_TASK, |req: &admin::TaskCreateRequest| {
            identifier(&req.id)
        });
        r.register(method::GET_TASK, |req: &admin::ObjectGetRequest| identifier(&req.id));
        r.register(
            method::LIST_TASK_IDS,
            |req: &admin::NamedEntityIdentifierListRequest| req.project.clone(),
        );
        r.register(method::LIST_TASKS, |req: &admin::ResourceListRequest| {
            named_entity(&req.id)
        });

        // Workflows
        r.register(method::CREATE_WORKFLOW, |req: &admin::WorkflowCreateRequest| {
            identifier(&req.id)
        });
        r.register(method::GET_WORKFLOW, |req: &admin::ObjectGetRequest| {
            identifier(&req.id)
        });
        r.register(
            method::LIST_WORKFLOW_IDS,
            |req: &admin::NamedEntityIdentifierListRequest| req.project.clone(),
        );
        r.register(method::LIST_WORKFLOWS, |req: &admin::ResourceListRequest| {
            named_entity(&req.id)
        });

        // Launch plans
        r.register(
            method::CREATE_LAUNCH_PLAN,
            |req: &admin::LaunchPlanCreateRequest| identifier(&req.id),
        );
        r.register(method::GET_LAUNCH_PLAN, |req: &admin::ObjectGetRequest| {
            identifier(&req.id)
        });
        r.register(
            method::GET_ACTIVE_LAUNCH_PLAN,
            |req: &admin::ActiveLaunchPlanRequest| named_entity(&req.id),
        );
        r.register(
            method::LIST_ACTIVE_LAUNCH_PLANS,
            |req: &admin::ActiveLaunchPlanListRequest| req.project.clone(),
        );
        r.register(
            method::LIST_LAUNCH_PLAN_IDS,
            |req: &admin::NamedEntityIdentifierListRequest| req.project.clone(),
        );
        r.register(method::LIST_LAUNCH_PLANS, |req: &admin::ResourceListRequest| {
            named_entity(&req.id)
        });
        r.register(
            method::UPDATE_LAUNCH_PLAN,
            |req: &admin::LaunchPlanUpdateRequest| identifier(&req.id),
        );

        // Executions
        r.register(method::CREATE_EXECUTION, |req: &admin::ExecutionCreateRequest| {
            req.project.clone()
        });
        r.register(
            method::RELAUNCH_EXECUTION,
            |req: &admin::ExecutionRelaunchRequest| execution(&req.id),
        );
        r.register(
            method::RECOVER_EXECUTION,
            |req: &admin::ExecutionRecoverRequest| execution(&req.id),
        );
        r.register(
            method::GET_EXECUTION,
            |req: &admin::WorkflowExecutionGetRequest| execution(&req.id),
        );
        r.register(method::UPDATE_EXECUTION, |req: &admin::ExecutionUpdateRequest| {
            execution(&req.id)
        });
        r.register(
            method::GET_EXECUTION_DATA,
            |req: &admin::WorkflowExecutionGetDataRequest| execution(&req.id),
        );
        r.register(method::LIST_EXECUTIONS, |req: &admin::ResourceListRequest| {
            named_entity(&req.id)
        });
        r.register(
            method::TERMINATE_EXECUTION,
            |req: &admin::ExecutionTerminateRequest| execution(&req.id),
        );
        r.register(
            method::GET_EXECUTION_METRICS,
            |req: &admin::WorkflowExecutionGetMetricsRequest| execution(&req.id),
        );

        // Node executions
        r.register(
            method::GET_NODE_EXECUTION,
            |req: &admin::NodeExecutionGetRequest| node_execution(&req.id),
        );
        r.register(
            method::GET_DYNAMIC_NODE_WORKFLOW,
            |req: &admin::GetDynamicNodeWorkflowRequest| node_execution(&req.id),
        );
        r.register(
            method::LIST_NODE_EXECUTIONS,
            |req: &admin::NodeExecutionListRequest| execution(&req.workflow_execution_id),
        );
        r.register(
            method::LIST_NODE_EXECUTIONS_FOR_TASK,
            |req: &admin::NodeExecutionForTaskListRequest| task_execution(&req.task_execution_id),
        );
        r.register(
            method::GET_NODE_EXECUTION_DATA,
            |req: &admin::NodeExecutionGetDataRequest| node_execution(&req.id),
        );

        // Task executions
        r.register(
            method::GET_TASK_EXECUTION,
            |req: &admin::TaskExecutionGetRequest| task_execution(&req.id),
        );
        r.register(
            method::LIST_TASK_EXECUTIONS,
            |req: &admin::TaskExecutionListRequest| node_execution(&req.node_execution_id),
        );
        r.register(
            method::GET_TASK_EXECUTION_DATA,
            |req: &admin::TaskExecutionGetDataRequest| task_execution(&req.id),
        );

        // Projects
        r.register(method::REGISTER_PROJECT, |req: &admin::ProjectRegisterRequest| {
            req.project.as_ref().map(|p| p.id.clone()).unwrap_or_default()
        });
        r.register(method::UPDATE_PROJECT, |req: &admin::Project| req.id.clone());

        // Matchable attributes
        r.register(
            method::UPDATE_PROJECT_DOMAIN_ATTRIBUTES,
            |req: &admin::ProjectDomainAttributesUpdateRequest| {
                req.attributes
                    .as_ref()
                    .map(|a| a.project.clone())
                    .unwrap_or_default()
            },
        );
        r.register(
            method::GET_PROJECT_DOMAIN_ATTRIBUTES,
            |req: &admin::ProjectDomainAttributesGetRequest| req.project.clone(),
        );
        r.register(
            method::DELETE_PROJECT_DOMAIN_ATTRIBUTES,
            |req: &admin::ProjectDomainAttributesDeleteRequest| req.project.clone(),
        );
        r.register(
            method::UPDATE_PROJECT_ATTRIBUTES,
            |req: &admin::ProjectAttributesUpdateRequest| {
                req.attributes
                    .as_ref()
                    .map(|a| a.project.clone())
                    .unwrap_or_default()
            },
        );
        r.register(
            method::GET_PROJECT_ATTRIBUTES,
            |req: &admin::ProjectAttributesGetRequest| req.project.clone(),
        );
        r.register(
            method::DELETE_PROJECT_ATTRIBUTES,
            |req: &admin::ProjectAttributesDeleteRequest| req.project.clone(),
        );
        r.register(
            method::UPDATE_WORKFLOW_ATTRIBUTES,
            |req: &admin::WorkflowAttributesUpdateRequest| {
                req.attributes
                    .as_ref()
                    .map(|a| a.project.clone())
                    .unwrap_or_default()
            },
        );
        r.register(
            method::GET_WORKFLOW_ATTRIBUTES,
            |req: &admin::WorkflowAttributesGetRequest| req.project.clone(),
        );
        r.register(
            method::DELETE_WORKFLOW_ATTRIBUTES,
            |req: &admin::WorkflowAttributesDeleteRequest| req.project.clone(),
        );

        // Named entities and descriptions
        r.register(
            method::LIST_NAMED_ENTITIES,
            |req: &admin::NamedEntityListRequest| req.project.clone(),
        );
        r.register(method::GET_NAMED_ENTITY, |req: &admin::NamedEntityGetRequest| {
            named_entity(&req.id)
        });
        r.register(
            method::UPDATE_NAMED_ENTITY,
            |req: &admin::NamedEntityUpdateRequest| named_entity(&req.id),
        );
        r.register(method::GET_DESCRIPTION_ENTITY, |req: &admin::ObjectGetRequest| {
            identifier(&req.id)
        });
        r.register(
            method::LIST_DESCRIPTION_ENTITIES,
            |req: &admin::DescriptionEntityListRequest| named_entity(&req.id),
        );

        r
    }
}

fn identifier(id: &Option<Identifier>) -> String {
    id.as_ref().map(|id| id.project.clone()).unwrap_or_default()
}

fn named_entity(id: &Option<NamedEntityIdentifier>) -> String {
    id.as_ref().map(|id| id.project.clone()).unwrap_or_default()
}

fn execution(id: &Option<WorkflowExecutionIdentifier>) -> String {
    id.as_ref().map(|id| id.project.clone()).unwrap_or_default()
}

fn node_execution(id: &Option<NodeExecutionIdentifier>) -> String {
    id.as_ref()
        .map(|id| execution(&id.execution_id))
        .unwrap_or_default()
}

fn task_execution(id: &Option<TaskExecutionIdentifier>) -> String {
    id.as_ref()
        .map(|id| identifier(&id.task_id))
        .unwrap_or_default()
}
