//! # 仓库文件树数据模型
//!
//! 定义了文件树节点（FileNode）和树视图行（TreeRow）的 Rust 结构体，
//! 对应前端 TypeScript 中的 `FileNode` 接口。
//!
//! ## 树不变式
//! - 文件夹节点可以有 `children`，不会有 `content`
//! - 文件节点可以有 `content`，绝不会有 `children`
//!
//! 树数据是纯不可变的 mock 结构，进程启动后构建一次，之后只读。
//! 展开/选中等可变状态与树数据完全分离，独立存放在
//! `services::tree::TreeView` 中（原始数据零注入原则）。

use serde::Serialize;

/// 节点类型枚举
///
/// 序列化为小写字符串，与前端的 `'file' | 'folder'` 字面量联合类型一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// 文件节点：叶子，可携带预览内容
    File,
    /// 文件夹节点：可携带有序子节点列表
    Folder,
}

/// 文件树节点数据结构
///
/// 表示 mock 仓库树中的一个文件或文件夹。
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface FileNode {
///   id: string;
///   name: string;
///   type: 'file' | 'folder';
///   children?: FileNode[];
///   content?: string;
///   language?: string;
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    /// 节点唯一标识，也是展开/选中状态的索引键
    pub id: String,

    /// 节点显示名称（文件名或目录名）
    pub name: String,

    /// 节点类型：file 或 folder
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// 子节点有序列表：仅文件夹非空；文件节点恒为空数组，
    /// 序列化时省略以贴合前端的可选字段
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,

    /// 文件预览内容：仅部分文件节点携带；
    /// None 表示二进制或大文件，前端显示"预览不可用"占位
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// 语言标记：用于前端选择文件图标和高亮方案
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl FileNode {
    /// 判断节点是否为文件夹
    pub fn is_folder(&self) -> bool {
        self.node_type == NodeType::Folder
    }
}

/// 树视图行数据结构
///
/// 树的展示层模型：由不可变的 `FileNode` 树和可变的 `TreeView` 状态
/// 联合计算出的扁平行列表，一行对应界面上的一个可见节点。
/// 前端拿到后按顺序渲染即可，无需自行递归。
///
/// 与 `FileNode` 完全分离，不持有对树数据的引用。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    /// 对应节点的 id
    pub id: String,
    /// 节点显示名称
    pub name: String,
    /// 节点类型：决定行图标和点击行为（文件夹切换展开，文件触发选中）
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// 缩进层级：根节点为 0
    pub depth: usize,
    /// 展开状态：仅对文件夹有意义，文件恒为 false
    pub expanded: bool,
    /// 选中状态：仅对文件有意义，同一时刻至多一行为 true
    pub selected: bool,
    /// 语言标记：透传自对应节点
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}
