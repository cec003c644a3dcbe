// Copyright 2025 eraflo
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

use std::fmt;

/// The lifecycle state of a resource node.
///
/// States only move forward: `Pending → Loading → Ready` or `Pending → Loading → Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    /// The node exists but its loader has not been invoked yet.
    Pending,
    /// The loader has been invoked and no outcome has been applied.
    Loading,
    /// The node holds its final export.
    Ready,
    /// The node failed permanently.
    Failed,
}

impl ResourceStatus {
    /// `Ready` and `Failed` are terminal: no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResourceStatus::Ready | ResourceStatus::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: ResourceStatus) -> bool {
        matches!(
            (self, next),
            (ResourceStatus::Pending, ResourceStatus::Loading)
                | (ResourceStatus::Loading, ResourceStatus::Ready)
                | (ResourceStatus::Loading, ResourceStatus::Failed)
        )
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceStatus::Pending => "pending",
            ResourceStatus::Loading => "loading",
            ResourceStatus::Ready => "ready",
            ResourceStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}
