//! In-memory provider stubs
//!
//! Every stub records the calls it receives. [`StubStackApi`] replays a
//! queue of scripted `ListStacks` responses; once only one is left it keeps
//! returning that one, which makes "still deleting" and "never ready"
//! scenarios a single `push_listing`.

use crate::error::{CloudError, Result};
use crate::provider::{
    BucketApi, Capability, CreateBucketOutput, CreateStackOutput, FunctionApi, FunctionUpdate,
    ResourceSummary, StackApi, StackStatus, StackSummary, UpdateStatus,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubStackCall {
    ListStacks,
    CreateStack {
        name: String,
        template_body: String,
        capabilities: Vec<Capability>,
    },
    DeleteStack {
        name: String,
    },
    ListStackResources {
        name: String,
    },
}

impl StubStackCall {
    pub fn kind(&self) -> &'static str {
        match self {
            StubStackCall::ListStacks => "ListStacks",
            StubStackCall::CreateStack { .. } => "CreateStack",
            StubStackCall::DeleteStack { .. } => "DeleteStack",
            StubStackCall::ListStackResources { .. } => "ListStackResources",
        }
    }
}

#[derive(Default)]
pub struct StubStackApi {
    listings: Mutex<VecDeque<Vec<StackSummary>>>,
    resources: Mutex<HashMap<String, Vec<ResourceSummary>>>,
    create_error: Mutex<Option<CloudError>>,
    calls: Mutex<Vec<StubStackCall>>,
}

impl StubStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `ListStacks` response
    pub fn push_listing(&self, stacks: Vec<(&str, StackStatus)>) {
        let listing = stacks
            .into_iter()
            .map(|(name, status)| StackSummary {
                name: name.to_string(),
                id: format!("arn:aws:cloudformation:us-east-1:123456789012:stack/{}/stub", name),
                status,
            })
            .collect();
        lock(&self.listings).push_back(listing);
    }

    pub fn set_resources(&self, stack_name: &str, resources: Vec<ResourceSummary>) {
        lock(&self.resources).insert(stack_name.to_string(), resources);
    }

    /// Make the next `CreateStack` fail with `error`
    pub fn fail_create(&self, error: CloudError) {
        *lock(&self.create_error) = Some(error);
    }

    pub fn calls(&self) -> Vec<StubStackCall> {
        lock(&self.calls).clone()
    }

    pub fn create_count(&self) -> usize {
        self.count("CreateStack")
    }

    pub fn delete_count(&self) -> usize {
        self.count("DeleteStack")
    }

    fn count(&self, kind: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind() == kind).count()
    }

    fn record(&self, call: StubStackCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl StackApi for StubStackApi {
    async fn list_stacks(&self, filter: &[StackStatus]) -> Result<Vec<StackSummary>> {
        self.record(StubStackCall::ListStacks);

        let mut listings = lock(&self.listings);
        let listing = if listings.len() > 1 {
            listings.pop_front().unwrap_or_default()
        } else {
            listings.front().cloned().unwrap_or_default()
        };

        Ok(listing
            .into_iter()
            .filter(|s| filter.contains(&s.status))
            .collect())
    }

    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        capabilities: &[Capability],
    ) -> Result<CreateStackOutput> {
        self.record(StubStackCall::CreateStack {
            name: name.to_string(),
            template_body: template_body.to_string(),
            capabilities: capabilities.to_vec(),
        });

        if let Some(error) = lock(&self.create_error).take() {
            return Err(error);
        }

        Ok(CreateStackOutput {
            stack_id: format!("arn:aws:cloudformation:us-east-1:123456789012:stack/{}/stub", name),
        })
    }

    async fn delete_stack(&self, name: &str) -> Result<()> {
        self.record(StubStackCall::DeleteStack {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn list_stack_resources(&self, name: &str) -> Result<Vec<ResourceSummary>> {
        self.record(StubStackCall::ListStackResources {
            name: name.to_string(),
        });

        lock(&self.resources).get(name).cloned().ok_or_else(|| {
            CloudError::provider(400, format!("Stack with id {} does not exist", name))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubFunctionCall {
    ListFunctions,
    UpdateCode { name: String, size: usize },
    UpdateHandler { name: String, handler: String },
}

pub struct StubFunctionApi {
    functions: Mutex<Vec<String>>,
    code_status: Mutex<UpdateStatus>,
    calls: Mutex<Vec<StubFunctionCall>>,
}

impl Default for StubFunctionApi {
    fn default() -> Self {
        Self {
            functions: Mutex::new(Vec::new()),
            code_status: Mutex::new(UpdateStatus::Successful),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl StubFunctionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_function(&self, name: &str) {
        lock(&self.functions).push(name.to_string());
    }

    /// Status reported by every later code upload
    pub fn set_code_status(&self, status: UpdateStatus) {
        *lock(&self.code_status) = status;
    }

    pub fn calls(&self) -> Vec<StubFunctionCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: StubFunctionCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl FunctionApi for StubFunctionApi {
    async fn list_functions(&self) -> Result<Vec<String>> {
        self.record(StubFunctionCall::ListFunctions);
        Ok(lock(&self.functions).clone())
    }

    async fn update_function_code(
        &self,
        name: &str,
        zip_bytes: Vec<u8>,
    ) -> Result<FunctionUpdate> {
        self.record(StubFunctionCall::UpdateCode {
            name: name.to_string(),
            size: zip_bytes.len(),
        });

        Ok(FunctionUpdate {
            function_name: name.to_string(),
            status: lock(&self.code_status).clone(),
            code_size: zip_bytes.len() as i64,
            handler: None,
        })
    }

    async fn update_function_handler(&self, name: &str, handler: &str) -> Result<FunctionUpdate> {
        self.record(StubFunctionCall::UpdateHandler {
            name: name.to_string(),
            handler: handler.to_string(),
        });

        Ok(FunctionUpdate {
            function_name: name.to_string(),
            status: UpdateStatus::Successful,
            code_size: 0,
            handler: Some(handler.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubBucketCall {
    ListBuckets,
    CreateBucket { name: String },
}

/// Buckets live in memory; a successful create makes the bucket listable
#[derive(Default)]
pub struct StubBucketApi {
    buckets: Mutex<Vec<String>>,
    create_error: Mutex<Option<CloudError>>,
    calls: Mutex<Vec<StubBucketCall>>,
}

impl StubBucketApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bucket(&self, name: &str) {
        lock(&self.buckets).push(name.to_string());
    }

    /// Make the next `CreateBucket` fail with `error`
    pub fn fail_create(&self, error: CloudError) {
        *lock(&self.create_error) = Some(error);
    }

    pub fn calls(&self) -> Vec<StubBucketCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: StubBucketCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl BucketApi for StubBucketApi {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        self.record(StubBucketCall::ListBuckets);
        Ok(lock(&self.buckets).clone())
    }

    async fn create_bucket(&self, name: &str) -> Result<CreateBucketOutput> {
        self.record(StubBucketCall::CreateBucket {
            name: name.to_string(),
        });

        if let Some(error) = lock(&self.create_error).take() {
            return Err(error);
        }

        self.add_bucket(name);
        Ok(CreateBucketOutput {
            location: Some(format!("/{}", name)),
        })
    }
}
