//! Remote resource access
//!
//! Everything the views know about Azure goes through the
//! [`ResourceProvider`] trait; the shipped implementation shells out to
//! the `az` CLI. Field mappings stay behind this boundary so the
//! navigation layer never sees provider-specific payloads.

mod azcli;
mod console;

pub use azcli::AzCliProvider;
pub use console::ConsoleSession;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An Azure subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionInfo {
    pub id: String,
    pub name: String,
}

/// A resource group within a subscription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceGroupInfo {
    pub name: String,
    pub location: String,
}

/// A generic resource within a resource group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub location: String,
}

/// A virtual machine list entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualMachineInfo {
    pub name: String,
    pub location: String,
}

/// Detail fields for a single virtual machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VirtualMachineDetail {
    pub name: String,
    pub id: String,
    pub location: String,
    pub os: String,
}

/// An AKS cluster list entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AksClusterInfo {
    pub name: String,
    pub location: String,
    pub kubernetes_version: String,
}

/// A runnable `az vm` subcommand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VmCommand {
    pub name: String,
    pub description: String,
}

/// Access to the remote resource hierarchy
///
/// Listing methods return plain collections; `open_serial_console` hands
/// back a live session whose reader task the owning view tears down.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list_subscriptions(&self) -> Result<Vec<SubscriptionInfo>>;

    async fn list_resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroupInfo>>;

    /// Distinct resource types present in a resource group.
    async fn list_resource_types(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<String>>;

    async fn list_resources(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_type: &str,
    ) -> Result<Vec<ResourceInfo>>;

    async fn list_virtual_machines(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachineInfo>>;

    async fn list_aks_clusters(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<AksClusterInfo>>;

    async fn virtual_machine_detail(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualMachineDetail>;

    async fn list_vm_commands(&self) -> Result<Vec<VmCommand>>;

    /// Run a remote command; returns its stdout.
    async fn run_vm_command(&self, args: &[String]) -> Result<String>;

    /// Open a live serial-console stream for a virtual machine.
    fn open_serial_console(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<ConsoleSession>;
}
