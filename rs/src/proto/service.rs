//! Fully-qualified gRPC method names of the admin service.

pub const CREATE_TASK: &str = "/flyteidl.service.AdminService/CreateTask";
pub const GET_TASK: &str = "/flyteidl.service.AdminService/GetTask";
pub const LIST_TASK_IDS: &str = "/flyteidl.service.AdminService/ListTaskIds";
pub const LIST_TASKS: &str = "/flyteidl.service.AdminService/ListTasks";
pub const CREATE_WORKFLOW: &str = "/flyteidl.service.AdminService/CreateWorkflow";
pub const GET_WORKFLOW: &str = "/flyteidl.service.AdminService/GetWorkflow";
pub const LIST_WORKFLOW_IDS: &str = "/flyteidl.service.AdminService/ListWorkflowIds";
pub const LIST_WORKFLOWS: &str = "/flyteidl.service.AdminService/ListWorkflows";
pub const CREATE_LAUNCH_PLAN: &str = "/flyteidl.service.AdminService/CreateLaunchPlan";
pub const GET_LAUNCH_PLAN: &str = "/flyteidl.service.AdminService/GetLaunchPlan";
pub const GET_ACTIVE_LAUNCH_PLAN: &str = "/flyteidl.service.AdminService/GetActiveLaunchPlan";
pub const LIST_ACTIVE_LAUNCH_PLANS: &str = "/flyteidl.service.AdminService/ListActiveLaunchPlans";
pub const LIST_LAUNCH_PLAN_IDS: &str = "/flyteidl.service.AdminService/ListLaunchPlanIds";
pub const LIST_LAUNCH_PLANS: &str = "/flyteidl.service.AdminService/ListLaunchPlans";
pub const UPDATE_LAUNCH_PLAN: &str = "/flyteidl.service.AdminService/UpdateLaunchPlan";
pub const CREATE_EXECUTION: &str = "/flyteidl.service.AdminService/CreateExecution";
pub const RELAUNCH_EXECUTION: &str = "/flyteidl.service.AdminService/RelaunchExecution";
pub const RECOVER_EXECUTION: &str = "/flyteidl.service.AdminService/RecoverExecution";
pub const GET_EXECUTION: &str = "/flyteidl.service.AdminService/GetExecution";
pub const UPDATE_EXECUTION: &str = "/flyteidl.service.AdminService/UpdateExecution";
pub const GET_EXECUTION_DATA: &str = "/flyteidl.service.AdminService/GetExecutionData";
pub const LIST_EXECUTIONS: &str = "/flyteidl.service.AdminService/ListExecutions";
pub const TERMINATE_EXECUTION: &str = "/flyteidl.service.AdminService/TerminateExecution";
pub const GET_NODE_EXECUTION: &str = "/flyteidl.service.AdminService/GetNodeExecution";
pub const GET_DYNAMIC_NODE_WORKFLOW: &str = "/flyteidl.service.AdminService/GetDynamicNodeWorkflow";
pub const LIST_NODE_EXECUTIONS: &str = "/flyteidl.service.AdminService/ListNodeExecutions";
pub const LIST_NODE_EXECUTIONS_FOR_TASK: &str = "/flyteidl.service.AdminService/ListNodeExecutionsForTask";
pub const GET_NODE_EXECUTION_DATA: &str = "/flyteidl.service.AdminService/GetNodeExecutionData";
pub const REGISTER_PROJECT: &str = "/flyteidl.service.AdminService/RegisterProject";
pub const UPDATE_PROJECT: &str = "/flyteidl.service.AdminService/UpdateProject";
pub const LIST_PROJECTS: &str = "/flyteidl.service.AdminService/ListProjects";
pub const CREATE_WORKFLOW_EVENT: &str = "/flyteidl.service.AdminService/CreateWorkflowEvent";
pub const CREATE_NODE_EVENT: &str = "/flyteidl.service.AdminService/CreateNodeEvent";
pub const CREATE_TASK_EVENT: &str = "/flyteidl.service.AdminService/CreateTaskEvent";
pub const GET_TASK_EXECUTION: &str = "/flyteidl.service.AdminService/GetTaskExecution";
pub const LIST_TASK_EXECUTIONS: &str = "/flyteidl.service.AdminService/ListTaskExecutions";
pub const GET_TASK_EXECUTION_DATA: &str = "/flyteidl.service.AdminService/GetTaskExecutionData";
pub const UPDATE_PROJECT_DOMAIN_ATTRIBUTES: &str = "/flyteidl.service.AdminService/UpdateProjectDomainAttributes";
pub const GET_PROJECT_DOMAIN_ATTRIBUTES: &str = "/flyteidl.service.AdminService/GetProjectDomainAttributes";
pub const DELETE_PROJECT_DOMAIN_ATTRIBUTES: &str = "/flyteidl.service.AdminService/DeleteProjectDomainAttributes";
pub const UPDATE_PROJECT_ATTRIBUTES: &str = "/flyteidl.service.AdminService/UpdateProjectAttributes";
pub const GET_PROJECT_ATTRIBUTES: &str = "/flyteidl.service.AdminService/GetProjectAttributes";
pub const DELETE_PROJECT_ATTRIBUTES: &str = "/flyteidl.service.AdminService/DeleteProjectAttributes";
pub const UPDATE_WORKFLOW_ATTRIBUTES: &str = "/flyteidl.service.AdminService/UpdateWorkflowAttributes";
pub const GET_WORKFLOW_ATTRIBUTES: &str = "/flyteidl.service.AdminService/GetWorkflowAttributes";
pub const DELETE_WORKFLOW_ATTRIBUTES: &str = "/flyteidl.service.AdminService/DeleteWorkflowAttributes";
pub const LIST_MATCHABLE_ATTRIBUTES: &str = "/flyteidl.service.AdminService/ListMatchableAttributes";
pub const LIST_NAMED_ENTITIES: &str = "/flyteidl.service.AdminService/ListNamedEntities";
pub const GET_NAMED_ENTITY: &str = "/flyteidl.service.AdminService/GetNamedEntity";
pub const UPDATE_NAMED_ENTITY: &str = "/flyteidl.service.AdminService/UpdateNamedEntity";
pub const GET_VERSION: &str = "/flyteidl.service.AdminService/GetVersion";
pub const GET_DESCRIPTION_ENTITY: &str = "/flyteidl.service.AdminService/GetDescriptionEntity";
pub const LIST_DESCRIPTION_ENTITIES: &str = "/flyteidl.service.AdminService/ListDescriptionEntities";
pub const GET_EXECUTION_METRICS: &str = "/flyteidl.service.AdminService/GetExecutionMetrics";
