//! # 仓库树 fixture 服务
//!
//! 提供 "AgapeIntelligence" 仓库的 mock 文件树。树是纯静态数据：
//! 进程内构建一次（`LazyLock`），此后只读。没有任何真实的仓库内省，
//! 所有节点、内容和语言标记都是写死的展示素材。

use std::sync::LazyLock;

use crate::models::repo::{FileNode, NodeType};

/// mock 仓库树单例
static MOCK_REPO: LazyLock<FileNode> = LazyLock::new(build_mock_repo);

/// 返回 mock 仓库树的根节点
pub fn repo_tree() -> &'static FileNode {
    &MOCK_REPO
}

/// 按 id 在树中查找节点（深度优先）
///
/// # 参数
/// - `root` - 查找起点
/// - `id` - 目标节点 id
pub fn find_node<'a>(root: &'a FileNode, id: &str) -> Option<&'a FileNode> {
    if root.id == id {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_node(child, id))
}

/// 校验树不变式：文件节点不得有子节点，文件夹节点不得有预览内容
///
/// mock 数据构建错误属于编程错误，测试中兜底验证。
pub fn tree_is_valid(node: &FileNode) -> bool {
    let self_valid = match node.node_type {
        NodeType::File => node.children.is_empty(),
        NodeType::Folder => node.content.is_none(),
    };
    self_valid && node.children.iter().all(tree_is_valid)
}

/// 构建 "AgapeIntelligence" 仓库的完整 mock 树
fn build_mock_repo() -> FileNode {
    folder(
        "root",
        "AgapeIntelligence",
        vec![
            folder(
                "core",
                "core",
                vec![
                    file_with_content(
                        "ethics_engine.py",
                        "ethics_engine.py",
                        "python",
                        "class EthicsEngine:\n    def evaluate(self, context):\n        # Primary directive: Benevolence\n        return True",
                    ),
                    file("logic_processor.cpp", "logic_processor.cpp", "cpp"),
                ],
            ),
            folder(
                "models",
                "models",
                vec![
                    file("agape_v1.pt", "agape_v1.pt", "binary"),
                    file("tokenizer.json", "tokenizer.json", "json"),
                ],
            ),
            folder(
                "web",
                "web",
                vec![
                    folder("src", "src", vec![file("App.tsx", "App.tsx", "typescript")]),
                    file("package.json", "package.json", "json"),
                ],
            ),
            file_with_content(
                "README.md",
                "README.md",
                "markdown",
                "# Agape Intelligence\n\nUnified framework for ethical artificial intelligence.",
            ),
            file("LICENSE", "LICENSE", "text"),
        ],
    )
}

/// 构建一个文件夹节点
fn folder(id: &str, name: &str, children: Vec<FileNode>) -> FileNode {
    FileNode {
        id: id.to_string(),
        name: name.to_string(),
        node_type: NodeType::Folder,
        children,
        content: None,
        language: None,
    }
}

/// 构建一个无预览内容的文件节点（二进制或大文件）
fn file(id: &str, name: &str, language: &str) -> FileNode {
    FileNode {
        id: id.to_string(),
        name: name.to_string(),
        node_type: NodeType::File,
        children: vec![],
        content: None,
        language: Some(language.to_string()),
    }
}

/// 构建一个带预览内容的文件节点
fn file_with_content(id: &str, name: &str, language: &str, content: &str) -> FileNode {
    FileNode {
        content: Some(content.to_string()),
        ..file(id, name, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_invariant_holds() {
        assert!(tree_is_valid(repo_tree()));
    }

    #[test]
    fn test_find_node_locates_nested_file() {
        let node = find_node(repo_tree(), "App.tsx").unwrap();
        assert_eq!(node.name, "App.tsx");
        assert_eq!(node.node_type, NodeType::File);
        assert_eq!(node.language.as_deref(), Some("typescript"));
    }

    #[test]
    fn test_find_node_unknown_id() {
        assert!(find_node(repo_tree(), "does-not-exist").is_none());
    }

    #[test]
    fn test_root_shape() {
        let root = repo_tree();
        assert_eq!(root.id, "root");
        assert_eq!(root.name, "AgapeIntelligence");
        assert!(root.is_folder());
        assert_eq!(root.children.len(), 5);
    }

    #[test]
    fn test_readme_carries_preview_content() {
        let readme = find_node(repo_tree(), "README.md").unwrap();
        assert!(readme.content.as_deref().unwrap().starts_with("# Agape Intelligence"));
        // 二进制文件没有预览内容
        let model = find_node(repo_tree(), "agape_v1.pt").unwrap();
        assert!(model.content.is_none());
    }
}
