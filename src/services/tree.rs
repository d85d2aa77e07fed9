//! # 文件树视图服务
//!
//! 树的展示层状态机：展开/折叠与单选状态，以及把不可变的 `FileNode` 树
//! 和可变状态联合压平成 `TreeRow` 行列表的递归计算。
//!
//! ## 交互契约
//! - 点击文件夹：只切换该节点自身的展开状态，兄弟节点和当前选中不受影响
//! - 点击文件：替换当前选中（单选），树的展开状态不受影响
//! - 默认折叠，调用方指定初始展开深度（本应用为 1，即根节点默认展开）
//!
//! 状态与树数据完全分离：`TreeView` 只记录节点 id 集合，
//! 绝不向 `FileNode` 注入任何可变字段。

use std::collections::HashSet;

use crate::models::repo::{FileNode, TreeRow};
use crate::services::repository::find_node;

/// 树视图状态
///
/// `expanded` 只对文件夹 id 有意义；`selected` 只会指向文件节点。
pub struct TreeView {
    /// 处于展开状态的文件夹 id 集合
    expanded: HashSet<String>,
    /// 当前选中的文件 id（单选，可为空）
    selected: Option<String>,
}

impl TreeView {
    /// 创建树视图状态，展开给定深度以内的文件夹
    ///
    /// # 参数
    /// - `root` - 树的根节点
    /// - `depth` - 初始展开深度：深度小于该值的文件夹初始为展开状态。
    ///   0 表示全部折叠，1 表示仅根节点展开
    pub fn with_initial_depth(root: &FileNode, depth: usize) -> Self {
        let mut expanded = HashSet::new();
        collect_expanded_to_depth(root, 0, depth, &mut expanded);
        Self {
            expanded,
            selected: None,
        }
    }

    /// 切换一个文件夹的展开状态
    ///
    /// 目标不存在或不是文件夹时为无操作。选中状态永不受影响。
    ///
    /// # 返回值
    /// true 表示状态发生了切换
    pub fn toggle(&mut self, root: &FileNode, id: &str) -> bool {
        let Some(node) = find_node(root, id) else {
            return false;
        };
        if !node.is_folder() {
            return false;
        }

        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
        true
    }

    /// 选中一个文件节点
    ///
    /// 单选语义：替换之前的任何选中。目标不存在或是文件夹时为无操作，
    /// 原有选中保持不变。展开状态永不受影响。
    ///
    /// # 返回值
    /// 选中成功时返回该节点的完整快照（含预览内容）
    pub fn select(&mut self, root: &FileNode, id: &str) -> Option<FileNode> {
        let node = find_node(root, id)?;
        if node.is_folder() {
            return None;
        }

        self.selected = Some(id.to_string());
        Some(node.clone())
    }

    /// 返回当前选中的文件节点快照
    pub fn selected_node(&self, root: &FileNode) -> Option<FileNode> {
        let id = self.selected.as_deref()?;
        find_node(root, id).cloned()
    }

    /// 判断指定文件夹当前是否展开
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// 计算当前可见的树行列表
    ///
    /// 从根开始递归下行，只进入展开状态的文件夹。
    /// 行顺序即界面渲染顺序（父节点在前，子节点紧随其后）。
    pub fn visible_rows(&self, root: &FileNode) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(root, 0, &mut rows);
        rows
    }

    /// 递归收集可见行
    fn push_rows(&self, node: &FileNode, depth: usize, rows: &mut Vec<TreeRow>) {
        let expanded = node.is_folder() && self.is_expanded(&node.id);
        rows.push(TreeRow {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type,
            depth,
            expanded,
            selected: self.selected.as_deref() == Some(node.id.as_str()),
            language: node.language.clone(),
        });

        if expanded {
            for child in &node.children {
                self.push_rows(child, depth + 1, rows);
            }
        }
    }
}

/// 收集深度小于 `limit` 的文件夹 id
fn collect_expanded_to_depth(
    node: &FileNode,
    depth: usize,
    limit: usize,
    expanded: &mut HashSet<String>,
) {
    if !node.is_folder() || depth >= limit {
        return;
    }
    expanded.insert(node.id.clone());
    for child in &node.children {
        collect_expanded_to_depth(child, depth + 1, limit, expanded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::repo::NodeType;
    use crate::services::repository::repo_tree;

    fn view() -> TreeView {
        // 与应用一致：根节点默认展开
        TreeView::with_initial_depth(repo_tree(), 1)
    }

    #[test]
    fn test_initial_depth_expands_only_root() {
        let view = view();
        assert!(view.is_expanded("root"));
        assert!(!view.is_expanded("core"));
        assert!(!view.is_expanded("web"));
    }

    #[test]
    fn test_visible_rows_respect_expansion() {
        let mut view = view();

        // 根展开：根 + 5 个一级子节点可见
        let rows = view.visible_rows(repo_tree());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].id, "root");
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].depth, 1);

        // 展开 core 后其两个子文件可见，顺序紧随 core 之后
        view.toggle(repo_tree(), "core");
        let rows = view.visible_rows(repo_tree());
        assert_eq!(rows.len(), 8);
        let core_index = rows.iter().position(|r| r.id == "core").unwrap();
        assert_eq!(rows[core_index + 1].id, "ethics_engine.py");
        assert_eq!(rows[core_index + 1].depth, 2);
    }

    #[test]
    fn test_toggle_does_not_affect_siblings_or_selection() {
        let mut view = view();
        let selected = view.select(repo_tree(), "README.md").unwrap();
        assert_eq!(selected.id, "README.md");

        view.toggle(repo_tree(), "core");
        view.toggle(repo_tree(), "models");
        view.toggle(repo_tree(), "core");

        // core 折叠回去，models 不受影响，选中保持
        assert!(!view.is_expanded("core"));
        assert!(view.is_expanded("models"));
        assert_eq!(
            view.selected_node(repo_tree()).unwrap().id,
            "README.md"
        );
    }

    #[test]
    fn test_toggle_ignores_files_and_unknown_ids() {
        let mut view = view();
        assert!(!view.toggle(repo_tree(), "README.md"));
        assert!(!view.toggle(repo_tree(), "missing"));
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let mut view = view();
        view.select(repo_tree(), "README.md").unwrap();
        let node = view.select(repo_tree(), "LICENSE").unwrap();

        assert_eq!(node.id, "LICENSE");
        assert_eq!(view.selected_node(repo_tree()).unwrap().id, "LICENSE");
    }

    #[test]
    fn test_select_folder_is_noop() {
        let mut view = view();
        view.select(repo_tree(), "README.md").unwrap();

        assert!(view.select(repo_tree(), "core").is_none());
        // 原有选中保持不变
        assert_eq!(view.selected_node(repo_tree()).unwrap().id, "README.md");
    }

    #[test]
    fn test_selected_row_flagged() {
        let mut view = view();
        view.select(repo_tree(), "README.md").unwrap();

        let rows = view.visible_rows(repo_tree());
        let selected_rows: Vec<_> = rows.iter().filter(|r| r.selected).collect();
        assert_eq!(selected_rows.len(), 1);
        assert_eq!(selected_rows[0].id, "README.md");
        assert_eq!(selected_rows[0].node_type, NodeType::File);
    }
}
