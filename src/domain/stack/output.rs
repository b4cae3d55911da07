// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deferred values produced by provisioning.
//!
//! An [`Output`] is a value that only exists once some upstream resource has
//! been resolved. Derivations are attached as continuations and run when the
//! upstream completes; nothing blocks a thread. Each upstream future runs at
//! most once, however many dependents subscribe to it, and an upstream error
//! reaches every dependent unchanged.

use crate::shared::error::{Result, StackError};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;

pub struct Output<T> {
    inner: Shared<BoxFuture<'static, Result<T>>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    pub fn ready(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    pub fn failed(error: StackError) -> Self {
        Self::new(future::ready(Err(error)))
    }

    /// Waits for the value. Only consumers at the edge of the program should
    /// need this; derivations use the `apply` family instead.
    pub async fn resolve(&self) -> Result<T> {
        self.inner.clone().await
    }

    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let upstream = self.inner.clone();
        Output::new(async move { upstream.await.map(f) })
    }

    pub fn try_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let upstream = self.inner.clone();
        Output::new(async move { f(upstream.await?) })
    }

    pub fn apply_async<U, F, Fut>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<U>> + Send + 'static,
    {
        let upstream = self.inner.clone();
        Output::new(async move {
            let value = upstream.await?;
            f(value).await
        })
    }

    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let left = self.inner.clone();
        let right = other.inner.clone();
        Output::new(async move { futures::try_join!(left, right) })
    }

    pub fn zip3<U, V>(&self, second: &Output<U>, third: &Output<V>) -> Output<(T, U, V)>
    where
        U: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let first = self.inner.clone();
        let second = second.inner.clone();
        let third = third.inner.clone();
        Output::new(async move { futures::try_join!(first, second, third) })
    }

    /// Resolves once `dependency` has resolved, yielding this output's value.
    pub fn after<U>(&self, dependency: &Output<U>) -> Output<T>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.zip(dependency).apply(|(value, _)| value)
    }

    pub fn all(outputs: Vec<Output<T>>) -> Output<Vec<T>> {
        let pending: Vec<_> = outputs.into_iter().map(|o| o.inner).collect();
        Output::new(future::try_join_all(pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_apply_runs_after_upstream() {
        let endpoint = Output::ready("https://x.example:6443".to_string());
        let host = endpoint.apply(|e| e.trim_start_matches("https://").to_string());
        assert_eq!(host.resolve().await.unwrap(), "x.example:6443");
    }

    #[tokio::test]
    async fn test_upstream_evaluated_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let upstream = Output::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("eks-cluster".to_string())
        });

        let a = upstream.apply(|name| format!("{}-a", name));
        let b = upstream.apply(|name| format!("{}-b", name));
        let (a, b) = a.zip(&b).resolve().await.unwrap();

        assert_eq!(a, "eks-cluster-a");
        assert_eq!(b, "eks-cluster-b");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_outputs_are_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let upstream = Output::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1u32)
        });
        let _derived = upstream.apply(|v| v + 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_propagates_to_dependents() {
        let cluster: Output<String> =
            Output::failed(StackError::provisioning("Cluster", "eks-cluster", "boom"));
        let derived_calls = Arc::new(AtomicUsize::new(0));
        let counter = derived_calls.clone();
        let derived = cluster.apply(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            name
        });

        let err = derived.resolve().await.unwrap_err();
        assert_eq!(err, StackError::provisioning("Cluster", "eks-cluster", "boom"));
        assert_eq!(derived_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zip3_waits_for_all() {
        let (tx, rx) = tokio::sync::oneshot::channel::<String>();
        let late = Output::new(async move {
            rx.await
                .map_err(|e| StackError::InvalidResource(e.to_string()))
        });
        let joined = Output::ready("a".to_string()).zip3(&Output::ready(2u8), &late);

        let handle = tokio::spawn({
            let joined = joined.clone();
            async move { joined.resolve().await }
        });
        tx.send("c".to_string()).unwrap();

        let (a, b, c) = handle.await.unwrap().unwrap();
        assert_eq!((a.as_str(), b, c.as_str()), ("a", 2, "c"));
    }

    #[tokio::test]
    async fn test_apply_async_and_all() {
        let ids = Output::all(vec![
            Output::ready("subnet-a".to_string()),
            Output::ready("subnet-b".to_string()),
        ]);
        let count = ids.apply_async(|ids| async move { Ok(ids.len()) });
        assert_eq!(count.resolve().await.unwrap(), 2);
    }
}
