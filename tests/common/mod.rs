// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    api::{Api, DeleteParams, Patch, PatchParams, PostParams},
    client::Client,
};
use serde_json::json;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not connected to a Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    let ns = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "ingress-hosts-test"
            }
        }
    }))?;

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<k8s_openapi::api::core::v1::Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Create an Ingress carrying the dns-name annotation
pub async fn create_annotated_ingress(
    client: &Client,
    namespace: &str,
    name: &str,
    annotation: &str,
    dns_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ingresses: Api<Ingress> = Api::namespaced(client.clone(), namespace);

    let ingress: Ingress = serde_json::from_value(json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "annotations": { annotation: dns_name }
        },
        "spec": {
            "defaultBackend": {
                "service": { "name": "backend", "port": { "number": 80 } }
            }
        }
    }))?;

    ingresses.create(&PostParams::default(), &ingress).await?;

    println!("Created Ingress: {namespace}/{name} ({dns_name})");
    Ok(())
}

/// Assign a load-balancer IP through the status subresource
pub async fn set_load_balancer_ip(
    client: &Client,
    namespace: &str,
    name: &str,
    ip: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ingresses: Api<Ingress> = Api::namespaced(client.clone(), namespace);

    let status = json!({
        "status": { "loadBalancer": { "ingress": [ { "ip": ip } ] } }
    });
    ingresses
        .patch_status(name, &PatchParams::default(), &Patch::Merge(&status))
        .await?;

    println!("Assigned {ip} to Ingress {namespace}/{name}");
    Ok(())
}
