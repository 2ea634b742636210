//! `az` CLI-backed resource provider
//!
//! Where no SDK binding is worth carrying, fall back to shelling out to
//! the Azure CLI with `-o json` and parsing its output.

use super::{
    AksClusterInfo, ConsoleSession, ResourceGroupInfo, ResourceInfo, ResourceProvider,
    SubscriptionInfo, VirtualMachineDetail, VirtualMachineInfo, VmCommand,
};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

/// Resource provider that drives the `az` CLI
#[derive(Debug, Default)]
pub struct AzCliProvider;

impl AzCliProvider {
    pub fn new() -> Self {
        Self
    }

    async fn run_az(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("running az {}", args.join(" "));

        let output = Command::new("az")
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .context("failed to run az; is the Azure CLI installed?")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "az {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_az_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = self.run_az(args).await?;
        serde_json::from_str(&stdout).context("failed to parse az output as JSON")
    }
}

/// Raw AKS cluster shape as emitted by `az aks list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAksCluster {
    name: String,
    location: String,
    #[serde(default)]
    kubernetes_version: Option<String>,
}

/// Parse the `Commands:` section of `az <group> --help` output.
fn parse_command_help(help: &str) -> Vec<VmCommand> {
    let Some((_, commands)) = help.split_once("Commands:") else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for line in commands.lines() {
        let Some((name, description)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        // Subgroup headers and continuation lines have no single-word name.
        if name.is_empty() || name.contains(' ') {
            continue;
        }
        result.push(VmCommand {
            name: name.trim_end_matches(" [Preview]").to_string(),
            description: description.trim().to_string(),
        });
    }

    result
}

#[async_trait]
impl ResourceProvider for AzCliProvider {
    async fn list_subscriptions(&self) -> Result<Vec<SubscriptionInfo>> {
        self.run_az_json(&["account", "list", "-o", "json"]).await
    }

    async fn list_resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroupInfo>> {
        self.run_az_json(&[
            "group",
            "list",
            "--subscription",
            subscription_id,
            "-o",
            "json",
        ])
        .await
    }

    async fn list_resource_types(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<String>> {
        let resources: Vec<ResourceInfo> = self
            .run_az_json(&[
                "resource",
                "list",
                "-g",
                resource_group,
                "--subscription",
                subscription_id,
                "-o",
                "json",
            ])
            .await?;

        let types: BTreeSet<String> = resources.into_iter().map(|r| r.resource_type).collect();
        Ok(types.into_iter().collect())
    }

    async fn list_resources(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_type: &str,
    ) -> Result<Vec<ResourceInfo>> {
        self.run_az_json(&[
            "resource",
            "list",
            "-g",
            resource_group,
            "--resource-type",
            resource_type,
            "--subscription",
            subscription_id,
            "-o",
            "json",
        ])
        .await
    }

    async fn list_virtual_machines(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<VirtualMachineInfo>> {
        self.run_az_json(&[
            "vm",
            "list",
            "-g",
            resource_group,
            "--subscription",
            subscription_id,
            "-o",
            "json",
        ])
        .await
    }

    async fn list_aks_clusters(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<AksClusterInfo>> {
        let raw: Vec<RawAksCluster> = self
            .run_az_json(&[
                "aks",
                "list",
                "-g",
                resource_group,
                "--subscription",
                subscription_id,
                "-o",
                "json",
            ])
            .await?;

        Ok(raw
            .into_iter()
            .map(|c| AksClusterInfo {
                name: c.name,
                location: c.location,
                kubernetes_version: c.kubernetes_version.unwrap_or_else(|| "unknown".to_string()),
            })
            .collect())
    }

    async fn virtual_machine_detail(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<VirtualMachineDetail> {
        let vm: serde_json::Value = self
            .run_az_json(&[
                "vm",
                "show",
                "-g",
                resource_group,
                "-n",
                name,
                "--subscription",
                subscription_id,
                "-o",
                "json",
            ])
            .await?;

        let field = |v: &serde_json::Value, key: &str| {
            v.get(key)
                .and_then(|f| f.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let os = vm
            .pointer("/storageProfile/osDisk/osType")
            .and_then(|f| f.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(VirtualMachineDetail {
            name: field(&vm, "name"),
            id: field(&vm, "id"),
            location: field(&vm, "location"),
            os,
        })
    }

    async fn list_vm_commands(&self) -> Result<Vec<VmCommand>> {
        let help = self.run_az(&["vm", "--help"]).await?;
        let commands = parse_command_help(&help);
        if commands.is_empty() {
            bail!("no commands found in az vm --help output");
        }
        Ok(commands)
    }

    async fn run_vm_command(&self, args: &[String]) -> Result<String> {
        if args.is_empty() {
            bail!("empty command args");
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_az(&args).await
    }

    fn open_serial_console(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> Result<ConsoleSession> {
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let mut child = Command::new("az")
            .args([
                "serial-console",
                "connect",
                "-g",
                resource_group,
                "-n",
                name,
                "--subscription",
                subscription_id,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to start serial console session")?;

        let stdout = child
            .stdout
            .take()
            .context("serial console session has no stdout")?;

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        let _ = child.kill().await;
                        break;
                    }
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            if line_tx.send(line).is_err() {
                                let _ = child.kill().await;
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            let _ = line_tx.send(format!("console read error: {}", e));
                            break;
                        }
                    }
                }
            }
        });

        Ok(ConsoleSession::new(line_rx, shutdown_tx, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_help() {
        let help = "\
Group
    az vm : Manage Linux or Windows virtual machines.

Subgroups:
    boot-diagnostics : Troubleshoot the startup of an Azure Virtual Machine.

Commands:
    deallocate : Deallocate a VM so that computing resources are no longer allocated.
    restart : Restart VMs.
    start : Start a stopped VM.
";
        let commands = parse_command_help(help);
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["deallocate", "restart", "start"]);
        assert_eq!(commands[1].description, "Restart VMs.");
    }

    #[test]
    fn test_parse_command_help_without_commands_section() {
        assert!(parse_command_help("no such section").is_empty());
    }

    #[test]
    fn test_raw_aks_cluster_mapping() {
        let raw: Vec<RawAksCluster> = serde_json::from_str(
            r#"[{"name": "prod", "location": "eastus", "kubernetesVersion": "1.31.2", "extra": true}]"#,
        )
        .unwrap();
        assert_eq!(raw[0].name, "prod");
        assert_eq!(raw[0].kubernetes_version.as_deref(), Some("1.31.2"));
    }
}
